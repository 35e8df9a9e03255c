/// Approximate `1 / sqrt(x)` from a bit-level seed refined by one Newton-Raphson step.
/// Max relative error ~0.175%
///
/// Only meaningful for positive, finite `x`.
///
/// # Examples
///
/// ```
/// use rs_quadtree_collisions::utils::fast_inv_sqrt;
///
/// let approx = fast_inv_sqrt(4.0);
/// assert!((approx - 0.5).abs() < 0.5 * 0.002);
/// ```
#[inline]
pub fn fast_inv_sqrt(x: f32) -> f32 {
    const MAGIC: u32 = 0x5f37_59df;

    let half_x = 0.5 * x;
    let seed = f32::from_bits(MAGIC - (x.to_bits() >> 1));

    // One Newton-Raphson iteration
    seed * (1.5 - half_x * seed * seed)
}
