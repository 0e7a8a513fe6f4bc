/// Infallible conversion from `u32` into an array index.
pub trait FromU32 {
    fn from_u32(src: u32) -> Self;
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl FromU32 for usize {
    #[inline(always)]
    fn from_u32(src: u32) -> Self {
        // usize has at least 32 bits on the supported targets.
        Self::try_from(src).unwrap()
    }
}
