/// Primitive Go types, keyed by the label templates use for them.
///
/// Merged into a registry by [`TypeBindings::with_basics`](crate::TypeBindings::with_basics).
pub const BASICS: [(&str, &str); 19] = [
    ("Bool", "bool"),
    ("String", "string"),
    ("Int", "int"),
    ("Int8", "int8"),
    ("Int16", "int16"),
    ("Int32", "int32"),
    ("Int64", "int64"),
    ("UInt", "uint"),
    ("UInt8", "uint8"),
    ("UInt16", "uint16"),
    ("UInt32", "uint32"),
    ("UInt64", "uint64"),
    ("UintPtr", "uintptr"),
    ("Byte", "byte"),
    ("Rune", "rune"),
    ("Float32", "float32"),
    ("Float64", "float64"),
    ("Complex64", "complex64"),
    ("Complex128", "complex128"),
];
