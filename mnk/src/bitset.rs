/// Implements union (`|`) and intersection (`&`) for a `Copy` bitset
/// newtype with a single `bits` field.
macro_rules! bitset_traits {
    ($name:ident) => {
        impl std::ops::BitAnd for $name {
            type Output = Self;

            fn bitand(self, rhs: Self) -> Self::Output {
                Self {
                    bits: self.bits & rhs.bits,
                }
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self::Output {
                Self {
                    bits: self.bits | rhs.bits,
                }
            }
        }
    };
}
pub(crate) use bitset_traits;
