use core::ops::Add;

/// The values combined by a reduction (and produced by a map).
///
/// We only ask for the bare minimum: an additive identity and `+`. Anything
/// fancier (exponentials, promotion of constants) is the business of the
/// callbacks, not of the partitioning machinery.
///
/// `+` is assumed to be commutative and associative up to floating-point
/// reassociation. Nothing checks this.
pub trait Scalar: Copy + Add<Output = Self> + Send + Sync {
    /// the additive identity
    fn zero() -> Self;
}

impl Scalar for f64 {
    #[inline(always)]
    fn zero() -> Self {
        0.0
    }
}

impl Scalar for f32 {
    #[inline(always)]
    fn zero() -> Self {
        0.0
    }
}
