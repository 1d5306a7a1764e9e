#![forbid(unsafe_code)]

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub aliases: Vec<TypeAliasDecl>,
    pub records: Vec<RecordDecl>,
    pub sum_types: Vec<SumTypeDecl>,
    pub functions: Vec<FunctionDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub target_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDecl {
    pub name: String,
    pub fields: Vec<RecordField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub ty: String,
    pub mutability: FieldMutability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMutability {
    Val,
    Var,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SumTypeDecl {
    pub name: String,
    pub variants: Vec<VariantDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantDecl {
    pub name: String,
    pub fields: Vec<VariantField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantField {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: String, // "void" means no value
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDecl),
    Assign(AssignStmt),
    Print(Expr),
    Expr(Expr),
    Return(Option<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: Option<String>,
    pub mutability: DeclMutability,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclMutability {
    Const,
    Val,
    Var,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    Null,
    Str(String),
    Var(String),
    Binary(BinaryExpr),
    If(IfExpr),
    Ternary(TernaryExpr),
    Elvis(ElvisExpr),
    Match(MatchExpr),
    RecordLit(RecordLit),
    Field(FieldAccess),
    SafeField(FieldAccess),
    Index(IndexAccess),
    ArrayAlloc(ArrayAlloc),
    MapAlloc(MapAlloc),
    MapLit(MapLit),
    Call(CallExpr),
    Lambda(LambdaExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: String,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_block: Block,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpr {
    pub condition: Box<Expr>,
    pub if_true: Box<Expr>,
    pub if_false: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElvisExpr {
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpr {
    pub target: Box<Expr>,
    pub cases: Vec<MatchCase>,
    pub else_expr: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordLit {
    pub type_name: String,
    pub fields: IndexMap<String, Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccess {
    pub target: Box<Expr>,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexAccess {
    pub target: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAlloc {
    pub element_type: String,
    pub size: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapAlloc {
    pub key_type: String,
    pub value_type: String,
    pub capacity: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLit {
    pub key_type: String,
    pub value_type: String,
    pub entries: Vec<MapEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: String,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub params: Vec<Param>,
    pub return_type: String,
    pub body: Block,
    pub captures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Wildcard,
    Var(String),
    Literal(Expr),
    Record(RecordPattern),
    Variant(VariantPattern),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordPattern {
    pub type_name: String,
    pub fields: Vec<RecordFieldPattern>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordFieldPattern {
    pub field: String,
    pub pattern: Pattern,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantPattern {
    pub type_name: String,
    pub variant: String,
    pub fields: Vec<Pattern>,
}
