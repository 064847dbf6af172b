// Unwraps a decoding step, forwarding a "not decodable" outcome to the
// caller of the enclosing function unchanged.
macro_rules! step {
    ($e:expr) => {
        match $e? {
            ::std::ops::ControlFlow::Continue(v) => v,
            ::std::ops::ControlFlow::Break(stop) => {
                return Ok(::std::ops::ControlFlow::Break(stop));
            }
        }
    };
}
