// implemented where a channel subscription holds an Rc back to its owner and the cycle must be broken by hand
pub trait Destroyable {
    fn destroy(&mut self);
}
