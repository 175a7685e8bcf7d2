use crate::error::{AsymError, AsymResult};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Partial-wave moments of the dihadron angular distribution, in wave-index order.
///
/// ```text
///  b:   0  1  2  3  4  5  6  7  8  9 10 11
/// tw:   2  2  2  3  3  3  3  3  3  3  3  3
///  L:   1  2  2  0  1  1  1  2  2  2  2  2
///  M:   1  1  2  0 -1  0  1 -2 -1  0  1  2
/// ```
#[derive(
    Debug, Clone, Copy, EnumIter, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PartialWave {
    #[strum(serialize = "tw2_L1_M1")]
    Tw2L1M1,
    #[strum(serialize = "tw2_L2_M1")]
    Tw2L2M1,
    #[strum(serialize = "tw2_L2_M2")]
    Tw2L2M2,
    #[strum(serialize = "tw3_L0_M0")]
    Tw3L0M0,
    #[strum(serialize = "tw3_L1_M-1")]
    Tw3L1Mm1,
    #[strum(serialize = "tw3_L1_M0")]
    Tw3L1M0,
    #[strum(serialize = "tw3_L1_M1")]
    Tw3L1M1,
    #[strum(serialize = "tw3_L2_M-2")]
    Tw3L2Mm2,
    #[strum(serialize = "tw3_L2_M-1")]
    Tw3L2Mm1,
    #[strum(serialize = "tw3_L2_M0")]
    Tw3L2M0,
    #[strum(serialize = "tw3_L2_M1")]
    Tw3L2M1,
    #[strum(serialize = "tw3_L2_M2")]
    Tw3L2M2,
}

impl PartialWave {
    pub fn from_index(b: i64) -> AsymResult<Self> {
        usize::try_from(b)
            .ok()
            .and_then(|i| Self::iter().nth(i))
            .ok_or(AsymError::InvalidWaveIndex(b))
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// (twist, L, M)
    pub fn quantum_numbers(&self) -> (i32, i32, i32) {
        match self {
            Self::Tw2L1M1 => (2, 1, 1),
            Self::Tw2L2M1 => (2, 2, 1),
            Self::Tw2L2M2 => (2, 2, 2),
            Self::Tw3L0M0 => (3, 0, 0),
            Self::Tw3L1Mm1 => (3, 1, -1),
            Self::Tw3L1M0 => (3, 1, 0),
            Self::Tw3L1M1 => (3, 1, 1),
            Self::Tw3L2Mm2 => (3, 2, -2),
            Self::Tw3L2Mm1 => (3, 2, -1),
            Self::Tw3L2M0 => (3, 2, 0),
            Self::Tw3L2M1 => (3, 2, 1),
            Self::Tw3L2M2 => (3, 2, 2),
        }
    }

    pub fn twist(&self) -> i32 {
        self.quantum_numbers().0
    }

    pub fn l(&self) -> i32 {
        self.quantum_numbers().1
    }

    pub fn m(&self) -> i32 {
        self.quantum_numbers().2
    }

    /// Field name carrying this wave's fitted amplitude in trial rows.
    pub fn value_key(&self) -> String {
        format!("b_{}", self.index())
    }

    pub fn from_quantum_numbers(twist: i32, l: i32, m: i32) -> Option<Self> {
        Self::iter().find(|w| w.quantum_numbers() == (twist, l, m))
    }

    /// Every wave of one twist, in index order. Only twist 2 and 3 exist.
    pub fn for_twist(twist: i32) -> AsymResult<Vec<Self>> {
        if twist != 2 && twist != 3 {
            return Err(AsymError::InvalidTwist(twist));
        }
        Ok(Self::iter().filter(|w| w.twist() == twist).collect())
    }
}
