/// Binary structures of legacy Word documents:
/// - FIB (File Information Block)
/// - PLCs (positions with fixed-size elements)
/// - FKPs (formatted disk pages of character and paragraph exceptions)
/// - property exceptions and their application
pub mod fib;
pub mod fkp;
pub mod plcf;
pub mod properties;
