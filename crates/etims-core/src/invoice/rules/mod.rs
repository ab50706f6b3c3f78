//! Rule-based field matchers and normalizers for eTIMS invoices.

pub mod amounts;
pub mod confusions;
pub mod dates;
pub mod invoice_number;
pub mod kra_pin;
pub mod library;
pub mod names;
pub mod patterns;

pub use amounts::{format_amount, parse_amount};
pub use confusions::{CONFUSIONS, Confusion, ConfusionClass};
pub use dates::{DEFAULT_TEMPLATES, DateTemplates};
pub use invoice_number::{clean_invoice_number, validate_invoice_number};
pub use kra_pin::{PinCorrection, correct_pin, validate_pin};
pub use library::{
    FieldSpec, PatternDescriptor, PatternTag, field_spec, field_specs, patterns_for,
    required_fields,
};
pub use names::clean_name;
