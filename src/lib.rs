pub mod console;
pub mod match3;

pub mod utils {
    pub mod prelude {
        pub use anyhow::{anyhow, Context, Error};
        pub type Result<T> = anyhow::Result<T, Error>;

        pub use std::{
            collections::{BTreeSet, HashSet, HashMap},
            ops::{Add, Sub}
        };
    }
}

pub mod prelude {
    pub use super::console::*;
    pub use super::match3::prelude::*;
    pub use super::utils::prelude::*;
}
