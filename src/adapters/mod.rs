// Adapters layer: concrete input sources behind the `InputSource` port.

pub mod source;
