pub use deduction::*;
pub use observation::*;

mod deduction;
mod observation;
