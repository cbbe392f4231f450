pub mod grammars;
