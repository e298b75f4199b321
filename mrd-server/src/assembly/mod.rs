//! Incremental report assembly
//!
//! Turns a webhook batch of partial, untyped JSON fragments into one
//! coherent `MarketReport`:
//!
//! 1. Intake normalizes single-object vs array bodies ([`intake`])
//! 2. Each fragment is tagged with exactly one kind ([`classifier`])
//! 3. The tagged fragment's body is validated into a typed payload
//!    ([`validate`])
//! 4. Validated fragments are merged section-by-section into the store
//!    ([`assembler`])
//!
//! Processing is strictly in delivery order within one batch; the target
//! report id is batch-local state, so concurrent webhook calls cannot
//! interfere.

pub mod assembler;
pub mod classifier;
pub mod intake;
pub mod validate;

pub use assembler::{process_batch, BatchError, BatchResult, FragmentOutcome};
pub use classifier::{classify, FragmentKind};
pub use intake::normalize_batch;
pub use validate::{validate, Fragment, ValidationError};
