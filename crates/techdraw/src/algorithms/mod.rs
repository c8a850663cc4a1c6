pub mod border;
pub mod preprocessing;
pub mod threshold;
pub mod edges;
pub mod composite;
pub mod extraction;
pub mod simplification;
pub mod vectorize;

pub use preprocessing::*;
pub use threshold::*;
pub use edges::*;
pub use composite::*;
pub use extraction::*;
pub use simplification::*;
pub use vectorize::*;
