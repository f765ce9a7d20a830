// Domain-layer modules and shared errors/models
pub mod features {
    pub use crate::features::*;
}

pub mod explanation {
    pub use crate::explanation::*;
}

pub mod prediction {
    pub use crate::prediction::*;
}

pub mod stage {
    pub use crate::stage::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
