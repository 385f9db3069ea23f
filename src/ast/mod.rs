/// AST (Abstract Syntax Tree) module
/// Contains the parse tree and the passes that reshape it
///
/// Submodules:
/// - ast: Node kinds, field layouts and the generic tree node
/// - rewrite: Bottom-up transformations between block building and evaluation
pub mod ast;
pub mod rewrite;
