mod descriptor;
mod dispatcher;
mod port;

#[cfg(test)]
pub mod mock;

pub use descriptor::*;
pub use dispatcher::*;
pub use port::*;

#[cfg(test)]
pub use mock::MockHost;
