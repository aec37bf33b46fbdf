use crate::types::CellCoord;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// 64-bit FNV-1a hasher.
///
/// Used for per-cell seeds and world state hashes; unlike `DefaultHasher` its
/// output is fixed across platforms, releases and processes.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a(u64);

impl Fnv1a {
    pub fn new() -> Self {
        Self(FNV_OFFSET_BASIS)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.write(&v.to_le_bytes());
    }

    pub fn finish(&self) -> u64 {
        self.0
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for everything generated inside one cell.
///
/// Hashes the text `"x,y"`, so the seed depends on the coordinate alone and
/// never on generation order or any global random stream.
pub fn cell_seed(coord: CellCoord) -> u64 {
    let mut h = Fnv1a::new();
    h.write(format!("{},{}", coord.x, coord.y).as_bytes());
    h.finish()
}

/// One splitmix64 step: a cheap bijective mix of a 64-bit value.
/// Used to derive independent seeds from a cell seed and the world seed.
pub fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
