use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Edge length of one grid cell in world units.
pub const CELL_SIZE: f32 = 50.0;

/// Width of every road strip in world units.
pub const ROAD_WIDTH: f32 = 5.0;

/// Integer address of a cell on the unbounded grid.
///
/// `x` follows world X and `y` follows world Z; height never takes part in
/// addressing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    /// The spawn cell.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert a world position to the cell containing it.
    ///
    /// Floors toward negative infinity, so `x = -0.1` lands in cell `-1`
    /// rather than `0`. Non-finite input saturates.
    pub fn from_world(position: Vec3, cell_size: f32) -> Self {
        Self {
            x: (position.x / cell_size).floor() as i32,
            y: (position.z / cell_size).floor() as i32,
        }
    }

    pub fn checked_offset(self, dx: i32, dy: i32) -> Result<Self, WorldError> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Ok(Self { x, y }),
            _ => Err(WorldError::InvalidCoordinate {
                x: self.x,
                y: self.y,
                dx,
                dy,
            }),
        }
    }

    /// The four axis-adjacent coordinates (west, east, south, north).
    pub fn neighbors(self) -> [Result<Self, WorldError>; 4] {
        [
            self.checked_offset(-1, 0),
            self.checked_offset(1, 0),
            self.checked_offset(0, -1),
            self.checked_offset(0, 1),
        ]
    }

    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Biome-like classification of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellType {
    /// Universal connector: legal next to every other type.
    Highway = 0,
    City = 1,
    Commercial = 2,
    Desert = 3,
    Forest = 4,
    Snow = 5,
}

impl CellType {
    /// Every type in declaration order.
    pub const ALL: [CellType; 6] = [
        CellType::Highway,
        CellType::City,
        CellType::Commercial,
        CellType::Desert,
        CellType::Forest,
        CellType::Snow,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Whether the cell carries the ring of back-roads.
    pub fn has_back_roads(self) -> bool {
        matches!(self, CellType::City | CellType::Commercial)
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Small bit set over [`CellType`].
///
/// Iteration is always in declaration order, which keeps "pick the n-th
/// allowed type" reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<CellType>", into = "Vec<CellType>")]
pub struct CellTypeSet(u8);

impl CellTypeSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(0b0011_1111);

    pub fn of(types: &[CellType]) -> Self {
        types.iter().copied().collect()
    }

    pub fn contains(self, t: CellType) -> bool {
        self.0 & t.bit() != 0
    }

    pub fn insert(&mut self, t: CellType) {
        self.0 |= t.bit();
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = CellType> {
        CellType::ALL.into_iter().filter(move |t| self.contains(*t))
    }

    /// The n-th member in declaration order.
    pub fn nth(self, n: usize) -> Option<CellType> {
        self.iter().nth(n)
    }
}

impl FromIterator<CellType> for CellTypeSet {
    fn from_iter<I: IntoIterator<Item = CellType>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for t in iter {
            set.insert(t);
        }
        set
    }
}

impl From<Vec<CellType>> for CellTypeSet {
    fn from(types: Vec<CellType>) -> Self {
        types.into_iter().collect()
    }
}

impl From<CellTypeSet> for Vec<CellType> {
    fn from(set: CellTypeSet) -> Self {
        set.iter().collect()
    }
}

/// Road surface classification. Drives traction for the vehicle collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadType {
    Normal,
    Dirt,
    Ice,
}

impl RoadType {
    pub fn surface(self) -> SurfaceModifiers {
        match self {
            RoadType::Normal => SurfaceModifiers {
                acceleration: 1.0,
                steering: 1.0,
            },
            RoadType::Dirt => SurfaceModifiers {
                acceleration: 0.75,
                steering: 0.75,
            },
            RoadType::Ice => SurfaceModifiers {
                acceleration: 1.5,
                steering: 1.5,
            },
        }
    }
}

impl fmt::Display for RoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Multipliers a vehicle applies while driving on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceModifiers {
    pub acceleration: f32,
    pub steering: f32,
}

/// RGBA color of a drawn shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Tint {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const GRAY: Self = Self::rgb(130, 130, 130);
    pub const DARK_GRAY: Self = Self::rgb(80, 80, 80);
    pub const YELLOW: Self = Self::rgb(253, 249, 0);
    pub const GREEN: Self = Self::rgb(0, 228, 48);
    pub const DARK_GREEN: Self = Self::rgb(0, 117, 44);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLUE: Self = Self::rgb(0, 121, 241);
    pub const PURPLE: Self = Self::rgb(200, 122, 255);
    pub const BROWN: Self = Self::rgb(127, 106, 79);
    pub const SKY_BLUE: Self = Self::rgb(102, 191, 255);
}

/// Primitive mesh a descriptor is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Flat quad on the XZ plane; `scale.y` is ignored.
    Plane,
    Cube,
    /// Sphere inscribed in the `scale` box.
    Sphere,
}

/// Placement of a shape: center position and full extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// One placed object inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    pub shape: ShapeKind,
    pub transform: Transform,
    pub tint: Tint,
}

impl ContentDescriptor {
    /// Horizontal (XZ) extent of the object.
    pub fn footprint(&self) -> Rect2 {
        let p = self.transform.position;
        let half = self.transform.scale * 0.5;
        Rect2::new(
            Vec2::new(p.x - half.x, p.z - half.z),
            Vec2::new(p.x + half.x, p.z + half.z),
        )
    }
}

/// Axis-aligned rectangle on the XZ plane (`Vec2::y` is world Z).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect2 {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// True when the interiors intersect. Rectangles that only share an edge
    /// do not overlap.
    pub fn overlaps(&self, other: &Rect2) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}
