//! Fire-and-forget operator messages.

pub trait NotifierPort {
    fn notify(&self, message: &str);
}
