//! Sum-variant enumerations for entity kinds, unit classes, terrain, items
//! and stockpile resources (spec §3 data model).

use strum::{EnumCount, EnumIter};

/// Every positioned object the world can contain (spec §3 `Thing.kind`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThingKind {
    Agent,
    TownCenter,
    House,
    Altar,
    GuardTower,
    Castle,
    Wall,
    Door,
    Barracks,
    ArcheryRange,
    Stable,
    Blacksmith,
    Market,
    Monastery,
    University,
    Wonder,
    SiegeWorkshop,
    MangonelWorkshop,
    TrebuchetWorkshop,
    Dock,
    Outpost,
    Mill,
    Granary,
    LumberCamp,
    Quarry,
    MiningCamp,
    WeavingLoom,
    ClayOven,
    Lantern,
    Temple,
    Barrel,
    Tree,
    Pine,
    Bush,
    Cactus,
    Wheat,
    Stone,
    Gold,
    Fish,
    Stump,
    Corpse,
    Skeleton,
    Relic,
}

impl ThingKind {
    /// Background-layer kinds may coexist with a foreground occupant on the
    /// same cell (spec §4.1 "Background kinds").
    pub const fn is_background(self) -> bool {
        matches!(
            self,
            Self::Corpse | Self::Skeleton | Self::Relic | Self::Lantern
        )
    }

    /// Buildings (has HP/constructed progression, spec §4.9).
    pub const fn is_building(self) -> bool {
        matches!(
            self,
            Self::TownCenter
                | Self::House
                | Self::Altar
                | Self::GuardTower
                | Self::Castle
                | Self::Wall
                | Self::Door
                | Self::Barracks
                | Self::ArcheryRange
                | Self::Stable
                | Self::Blacksmith
                | Self::Market
                | Self::Monastery
                | Self::University
                | Self::Wonder
                | Self::SiegeWorkshop
                | Self::MangonelWorkshop
                | Self::TrebuchetWorkshop
                | Self::Dock
                | Self::Outpost
                | Self::Mill
                | Self::Granary
                | Self::LumberCamp
                | Self::Quarry
                | Self::MiningCamp
                | Self::WeavingLoom
                | Self::ClayOven
                | Self::Temple
        )
    }

    /// A wall or door is hostile to any non-owner (spec §4.5).
    pub const fn is_wall_or_door(self) -> bool {
        matches!(self, Self::Wall | Self::Door)
    }

    /// Resource nodes are diggable obstacles for connectivity repair and are
    /// harvested down to zero inventory (spec §4.1, §4.6).
    pub const fn is_resource_node(self) -> bool {
        matches!(
            self,
            Self::Tree
                | Self::Pine
                | Self::Bush
                | Self::Cactus
                | Self::Wheat
                | Self::Stone
                | Self::Gold
                | Self::Fish
                | Self::Stump
        )
    }

    /// Trees yield one extra Stump harvest before vanishing (spec §4.6).
    pub const fn is_tree(self) -> bool {
        matches!(self, Self::Tree | Self::Pine)
    }

    /// Diggable obstacles that connectivity repair may carve through, but
    /// never buildings or the map border (spec §4.1).
    pub const fn is_diggable(self) -> bool {
        self.is_resource_node() || matches!(self, Self::Wall)
    }

    /// Container-class buildings that can hold a garrison (spec §4.9).
    pub const fn garrison_capacity(self) -> Option<u32> {
        match self {
            Self::TownCenter => Some(15),
            Self::House => Some(5),
            Self::Castle => Some(20),
            Self::GuardTower => Some(5),
            Self::Monastery => Some(4),
            _ => None,
        }
    }

    /// Structures that auto-fire on enemies in range (spec §4.5).
    pub const fn auto_fires(self) -> bool {
        matches!(
            self,
            Self::GuardTower | Self::TownCenter | Self::Castle | Self::Outpost
        )
    }

    /// Population contribution of an owned building toward the team's
    /// population cap (spec §4.7).
    pub const fn population_contribution(self) -> u32 {
        match self {
            Self::House => 0, // HousePopCap is applied separately, see respawn module
            Self::TownCenter => 0,
            Self::Castle => 5,
            _ => 0,
        }
    }
}

/// Unit classes (spec §3 `Thing.unitClass`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitClass {
    Villager,
    Scout,
    Archer,
    ManAtArms,
    Knight,
    Monk,
    BatteringRam,
    Mangonel,
    Trebuchet,
    Boat,
    TradeCog,
    King,
    Goblin,
}

impl UnitClass {
    pub const fn is_water_unit(self) -> bool {
        matches!(self, Self::Boat | Self::TradeCog)
    }

    pub const fn is_siege(self) -> bool {
        matches!(self, Self::Mangonel | Self::Trebuchet | Self::BatteringRam)
    }

    /// Tank classes that project a damage-halving aura onto nearby allies
    /// (spec §4.5 "Aura mitigation").
    pub const fn aura_radius(self) -> Option<i32> {
        match self {
            Self::ManAtArms => Some(1),
            Self::Knight => Some(2),
            _ => None,
        }
    }

    pub const fn can_pack(self) -> bool {
        matches!(self, Self::Trebuchet)
    }
}

/// Terrain kinds (spec §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainKind {
    Empty,
    Grass,
    Road,
    Bridge,
    Sand,
    Dune,
    Snow,
    Mud,
    Fertile,
    ShallowWater,
    Water,
    RampUpN,
    RampUpS,
    RampUpE,
    RampUpW,
    RampDownN,
    RampDownS,
    RampDownE,
    RampDownW,
}

impl TerrainKind {
    /// Land units cannot enter (spec §4.2 "Classification").
    pub const fn is_blocked_for_land(self) -> bool {
        matches!(self, Self::Water)
    }

    pub const fn is_water(self) -> bool {
        matches!(self, Self::Water | Self::ShallowWater)
    }

    pub const fn is_ramp(self) -> bool {
        matches!(
            self,
            Self::RampUpN
                | Self::RampUpS
                | Self::RampUpE
                | Self::RampUpW
                | Self::RampDownN
                | Self::RampDownS
                | Self::RampDownE
                | Self::RampDownW
        )
    }

    pub const fn is_buildable(self) -> bool {
        !self.is_water()
    }

    pub const fn is_road(self) -> bool {
        matches!(self, Self::Road)
    }

    /// Movement speed modifier for land units (spec §4.2 fixed table). Water
    /// units use a separate always-1.0 rule (spec §4.4).
    pub const fn speed_modifier(self) -> f32 {
        match self {
            Self::Grass | Self::Road | Self::Bridge | Self::Fertile => 1.0,
            Self::Sand => 0.9,
            Self::Dune => 0.85,
            Self::Snow => 0.8,
            Self::Mud => 0.7,
            Self::ShallowWater => 0.5,
            Self::Water => 1.0,
            _ if self.is_ramp() => 1.0,
            Self::Empty => 1.0,
        }
    }

    /// Is this terrain a ramp-up in the given cardinal direction?
    pub const fn is_ramp_up_toward(self, direction: Orientation) -> bool {
        matches!(
            (self, direction),
            (Self::RampUpN, Orientation::N)
                | (Self::RampUpS, Orientation::S)
                | (Self::RampUpE, Orientation::E)
                | (Self::RampUpW, Orientation::W)
        )
    }

    /// Is this terrain a ramp-down in the given cardinal direction?
    pub const fn is_ramp_down_toward(self, direction: Orientation) -> bool {
        matches!(
            (self, direction),
            (Self::RampDownN, Orientation::N)
                | (Self::RampDownS, Orientation::S)
                | (Self::RampDownE, Orientation::E)
                | (Self::RampDownW, Orientation::W)
        )
    }
}

/// Item kinds carried in inventories (spec §4.8).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    Wood,
    Stone,
    GoldOre,
    Wheat,
    Berries,
    Fish,
    Meat,
    Spear,
}

impl ItemKind {
    pub const fn is_food(self) -> bool {
        matches!(self, Self::Wheat | Self::Berries | Self::Fish | Self::Meat)
    }

    /// Per-item inventory cap (spec §3 invariant "bounded mapping").
    pub const fn cap(self) -> u32 {
        match self {
            Self::Spear => 1,
            _ => 20,
        }
    }
}

/// Team stockpile resources (spec §3, §4.8).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StockpileResource {
    Food,
    Wood,
    Gold,
    Stone,
    Water,
}

/// Facing direction for agents (spec §3 `Thing.orientation`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    N,
    S,
    W,
    E,
}

impl Orientation {
    /// Cardinal unit vector `(dx, dy)`; `y` increases southward.
    pub const fn unit_vector(self) -> (i32, i32) {
        match self {
            Self::N => (0, -1),
            Self::S => (0, 1),
            Self::W => (-1, 0),
            Self::E => (1, 0),
        }
    }

    /// Decodes a direction argument. `0..=3` are cardinal; `4..=7` are
    /// diagonals the core never emits for movement (spec §4.4) but which
    /// attack targeting may still resolve to a primary cardinal cell.
    pub const fn from_arg(arg: u8) -> Option<Self> {
        match arg {
            0 => Some(Self::N),
            1 => Some(Self::S),
            2 => Some(Self::W),
            3 => Some(Self::E),
            _ => None,
        }
    }
}

/// Engagement posture (spec §3 `Thing.stance`). Not read by this core beyond
/// being carried on the entity — the external decision controller is the
/// consumer, per spec §1 scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stance {
    NoAttack,
    Defensive,
    Aggressive,
}
