//! Native value representation and wire-to-native type coercion.

mod coerce;
mod value;

pub use coerce::TypeCoercer;
pub use value::Value;
