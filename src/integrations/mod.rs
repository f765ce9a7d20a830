//! External model and endpoint integrations.

pub mod model_artifacts {
    pub use crate::model_artifacts::*;
}

pub mod client {
    pub use crate::client::*;
}
