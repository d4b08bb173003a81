// Series assembly: the normalized per-borehole records consumed by the
// renderers and the exporter, and the builder that reads them out of
// laboratory workbooks.

pub mod builder;
pub mod record;
pub mod report;

pub use builder::{IdentityPolicy, SeriesBuilder};
pub use record::{BoreholeSeries, Measurement, SeriesSet};
pub use report::{BuildReport, FileOutcome, Warning};
