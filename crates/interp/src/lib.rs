#![forbid(unsafe_code)]

mod pattern;
mod value;

pub use value::{MapKey, RecordInstance, Value};

use frontend::ast::*;
use indexmap::IndexMap;
use pattern::Bindings;
use project::Symbols;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("main function not found")]
    MissingMain,
    #[error("undefined variable {0}")]
    UndefinedVariable(String),
    #[error("unknown function {0}")]
    UnknownFunction(String),
    #[error("unknown record {0}")]
    UnknownRecord(String),
    #[error("function {name} expects {expected} argument(s) but received {received}")]
    ArityMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("binary op {0} expects ints")]
    BinaryOperands(String),
    #[error("unknown operator {0}")]
    UnknownOperator(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("if condition must be bool")]
    IfCondition,
    #[error("ternary condition must be bool")]
    TernaryCondition,
    #[error("field access on non-record")]
    FieldAccessOnNonRecord,
    #[error("safe field access on non-record")]
    SafeFieldAccessOnNonRecord,
    #[error("field assignment on non-record")]
    FieldAssignOnNonRecord,
    #[error("field {0} is immutable")]
    ImmutableField(String),
    #[error("missing field {0}")]
    MissingField(String),
    #[error("index access on non-collection")]
    IndexOnNonCollection,
    #[error("index assignment on non-collection")]
    IndexAssignOnNonCollection,
    #[error("array index must be an int")]
    ArrayIndexType,
    #[error("array index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("array size must be an int")]
    ArraySizeType,
    #[error("array size must be non-negative")]
    ArraySizeNegative,
    #[error("map key must be null, int, bool, or string")]
    UnsupportedMapKey,
    #[error("match expression missing else branch")]
    MatchMissingElse,
    #[error("pattern literal must be a constant")]
    NonConstantPattern,
    #[error("invalid assignment target")]
    InvalidAssignTarget,
    #[error("unsupported expression {0}")]
    UnsupportedExpr(&'static str),
    #[error("write output: {0}")]
    Output(#[from] io::Error),
}

/// Evaluation outcome of a statement or expression. `Return` is the
/// structured non-local exit raised by a return statement; it unwinds
/// through nested blocks and is caught only at the invocation boundary.
/// It deliberately never travels on the error channel.
enum Flow {
    Value(Value),
    Return(Value),
}

// unwrap a normal value, propagating a return signal to the caller
macro_rules! value_of {
    ($flow:expr) => {
        match $flow? {
            Flow::Value(value) => value,
            ret @ Flow::Return(_) => return Ok(ret),
        }
    };
}

#[derive(Debug, Clone, Default)]
struct Env {
    vars: HashMap<String, Value>,
}

impl Env {
    // value-producing blocks evaluate against a copy; composite values
    // still share state through their Rc interiors
    fn snapshot(&self) -> Env {
        self.clone()
    }
}

/// Locate `main` in the resolved symbols and execute it.
pub fn run_main(symbols: &Symbols, out: &mut dyn Write) -> Result<(), RuntimeError> {
    let main = symbols
        .functions
        .get("main")
        .ok_or(RuntimeError::MissingMain)?;
    let mut evaluator = Evaluator { symbols, out };
    evaluator.invoke(main, vec![])?;
    Ok(())
}

struct Evaluator<'a> {
    symbols: &'a Symbols,
    out: &'a mut dyn Write,
}

impl<'a> Evaluator<'a> {
    fn invoke(&mut self, function: &FunctionDecl, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if function.params.len() != args.len() {
            return Err(RuntimeError::ArityMismatch {
                name: function.name.clone(),
                expected: function.params.len(),
                received: args.len(),
            });
        }
        let mut env = Env::default();
        for (param, arg) in function.params.iter().zip(args) {
            env.vars.insert(param.name.clone(), arg);
        }
        match self.eval_block(&function.body, &mut env)? {
            Flow::Return(value) => Ok(value),
            Flow::Value(_) => Ok(Value::Null),
        }
    }

    fn eval_block(&mut self, block: &Block, env: &mut Env) -> Result<Flow, RuntimeError> {
        for stmt in &block.statements {
            if let ret @ Flow::Return(_) = self.eval_stmt(stmt, env)? {
                return Ok(ret);
            }
        }
        Ok(Flow::Value(Value::Null))
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: &mut Env) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::VarDecl(decl) => {
                let value = value_of!(self.eval_expr(&decl.value, env));
                env.vars.insert(decl.name.clone(), value);
                Ok(Flow::Value(Value::Null))
            }
            Stmt::Assign(assign) => self.eval_assign(assign, env),
            Stmt::Print(expr) => {
                let value = value_of!(self.eval_expr(expr, env));
                writeln!(self.out, "{value}")?;
                Ok(Flow::Value(Value::Null))
            }
            Stmt::Expr(expr) => self.eval_expr(expr, env),
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => value_of!(self.eval_expr(expr, env)),
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    /// A block in expression position: statements run against a snapshot
    /// of the enclosing environment, and the block's value is the value of
    /// its final expression statement, or null.
    fn eval_block_value(&mut self, block: &Block, env: &Env) -> Result<Flow, RuntimeError> {
        let mut local = env.snapshot();
        let mut last = Value::Null;
        for stmt in &block.statements {
            last = match stmt {
                Stmt::Expr(expr) => value_of!(self.eval_expr(expr, &mut local)),
                other => {
                    value_of!(self.eval_stmt(other, &mut local));
                    Value::Null
                }
            };
        }
        Ok(Flow::Value(last))
    }

    fn eval_assign(&mut self, assign: &AssignStmt, env: &mut Env) -> Result<Flow, RuntimeError> {
        match &assign.target {
            Expr::Var(name) => {
                let value = value_of!(self.eval_expr(&assign.value, env));
                env.vars.insert(name.clone(), value);
            }
            Expr::Field(access) => {
                let target = value_of!(self.eval_expr(&access.target, env));
                let Value::Record(instance) = target else {
                    return Err(RuntimeError::FieldAssignOnNonRecord);
                };
                if instance.borrow().immutable_fields.contains(&access.field) {
                    return Err(RuntimeError::ImmutableField(access.field.clone()));
                }
                let value = value_of!(self.eval_expr(&assign.value, env));
                instance
                    .borrow_mut()
                    .fields
                    .insert(access.field.clone(), value);
            }
            Expr::Index(access) => {
                let container = value_of!(self.eval_expr(&access.target, env));
                let index = value_of!(self.eval_expr(&access.index, env));
                let value = value_of!(self.eval_expr(&assign.value, env));
                match container {
                    Value::Array(items) => {
                        let i = array_index(&index, items.borrow().len())?;
                        items.borrow_mut()[i] = value;
                    }
                    Value::Map(entries) => {
                        let key = index
                            .as_map_key()
                            .ok_or(RuntimeError::UnsupportedMapKey)?;
                        entries.borrow_mut().insert(key, value);
                    }
                    _ => return Err(RuntimeError::IndexAssignOnNonCollection),
                }
            }
            _ => return Err(RuntimeError::InvalidAssignTarget),
        }
        Ok(Flow::Value(Value::Null))
    }

    fn eval_expr(&mut self, expr: &Expr, env: &mut Env) -> Result<Flow, RuntimeError> {
        let value = match expr {
            Expr::Int(v) => Value::Int(*v),
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Null => Value::Null,
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Var(name) => env
                .vars
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone()))?,
            Expr::Binary(binary) => {
                let left = value_of!(self.eval_expr(&binary.left, env));
                let right = value_of!(self.eval_expr(&binary.right, env));
                eval_binary(&binary.op, left, right)?
            }
            Expr::If(if_expr) => return self.eval_if(if_expr, env),
            Expr::Ternary(ternary) => {
                let condition = value_of!(self.eval_expr(&ternary.condition, env));
                let Value::Bool(condition) = condition else {
                    return Err(RuntimeError::TernaryCondition);
                };
                let selected = if condition {
                    &ternary.if_true
                } else {
                    &ternary.if_false
                };
                return self.eval_expr(selected, env);
            }
            Expr::Elvis(elvis) => {
                let left = value_of!(self.eval_expr(&elvis.left, env));
                if !left.is_null() {
                    left
                } else {
                    value_of!(self.eval_expr(&elvis.right, env))
                }
            }
            Expr::Match(match_expr) => return self.eval_match(match_expr, env),
            Expr::RecordLit(lit) => return self.eval_record_lit(lit, env),
            Expr::Field(access) => {
                let target = value_of!(self.eval_expr(&access.target, env));
                let Value::Record(instance) = target else {
                    return Err(RuntimeError::FieldAccessOnNonRecord);
                };
                let value = instance.borrow().fields.get(&access.field).cloned();
                value.unwrap_or(Value::Null)
            }
            Expr::SafeField(access) => {
                let target = value_of!(self.eval_expr(&access.target, env));
                if target.is_null() {
                    Value::Null
                } else {
                    let Value::Record(instance) = target else {
                        return Err(RuntimeError::SafeFieldAccessOnNonRecord);
                    };
                    let value = instance.borrow().fields.get(&access.field).cloned();
                    value.unwrap_or(Value::Null)
                }
            }
            Expr::Index(access) => {
                let target = value_of!(self.eval_expr(&access.target, env));
                let index = value_of!(self.eval_expr(&access.index, env));
                match target {
                    Value::Array(items) => {
                        let i = array_index(&index, items.borrow().len())?;
                        let value = items.borrow()[i].clone();
                        value
                    }
                    Value::Map(entries) => {
                        let key = index
                            .as_map_key()
                            .ok_or(RuntimeError::UnsupportedMapKey)?;
                        let value = entries.borrow().get(&key).cloned();
                        value.unwrap_or(Value::Null)
                    }
                    _ => return Err(RuntimeError::IndexOnNonCollection),
                }
            }
            Expr::ArrayAlloc(alloc) => {
                let size = value_of!(self.eval_expr(&alloc.size, env));
                let Value::Int(size) = size else {
                    return Err(RuntimeError::ArraySizeType);
                };
                if size < 0 {
                    return Err(RuntimeError::ArraySizeNegative);
                }
                Value::array(vec![Value::Null; size as usize])
            }
            Expr::MapAlloc(alloc) => {
                // capacity is advisory
                value_of!(self.eval_expr(&alloc.capacity, env));
                Value::map(IndexMap::new())
            }
            Expr::MapLit(lit) => {
                let mut entries = IndexMap::new();
                for entry in &lit.entries {
                    let key = value_of!(self.eval_expr(&entry.key, env));
                    let value = value_of!(self.eval_expr(&entry.value, env));
                    let key = key.as_map_key().ok_or(RuntimeError::UnsupportedMapKey)?;
                    entries.insert(key, value);
                }
                Value::map(entries)
            }
            Expr::Call(call) => {
                let symbols = self.symbols;
                let Some(function) = symbols.functions.get(&call.callee) else {
                    return Err(RuntimeError::UnknownFunction(call.callee.clone()));
                };
                let mut args = Vec::with_capacity(call.arguments.len());
                for argument in &call.arguments {
                    args.push(value_of!(self.eval_expr(argument, env)));
                }
                self.invoke(function, args)?
            }
            Expr::Lambda(_) => return Err(RuntimeError::UnsupportedExpr("lambda")),
        };
        Ok(Flow::Value(value))
    }

    fn eval_if(&mut self, if_expr: &IfExpr, env: &mut Env) -> Result<Flow, RuntimeError> {
        let condition = value_of!(self.eval_expr(&if_expr.condition, env));
        let Value::Bool(condition) = condition else {
            return Err(RuntimeError::IfCondition);
        };
        if condition {
            return self.eval_block_value(&if_expr.then_block, env);
        }
        match &if_expr.else_block {
            Some(block) => self.eval_block_value(block, env),
            None => Ok(Flow::Value(Value::Null)),
        }
    }

    fn eval_match(&mut self, match_expr: &MatchExpr, env: &mut Env) -> Result<Flow, RuntimeError> {
        let target = value_of!(self.eval_expr(&match_expr.target, env));
        for case in &match_expr.cases {
            let mut bindings = Bindings::new();
            if pattern::match_pattern(&case.pattern, &target, &mut bindings)? {
                // pattern bindings are visible only inside this case's value
                let mut local = env.snapshot();
                for (name, value) in bindings {
                    local.vars.insert(name, value);
                }
                return self.eval_expr(&case.value, &mut local);
            }
        }
        match &match_expr.else_expr {
            Some(expr) => self.eval_expr(expr, env),
            None => Err(RuntimeError::MatchMissingElse),
        }
    }

    fn eval_record_lit(&mut self, lit: &RecordLit, env: &mut Env) -> Result<Flow, RuntimeError> {
        let symbols = self.symbols;
        let Some(decl) = symbols.records.get(&lit.type_name) else {
            return Err(RuntimeError::UnknownRecord(lit.type_name.clone()));
        };
        let mut fields = IndexMap::with_capacity(decl.fields.len());
        let mut immutable_fields = HashSet::new();
        for field in &decl.fields {
            let Some(expr) = lit.fields.get(&field.name) else {
                return Err(RuntimeError::MissingField(field.name.clone()));
            };
            let value = value_of!(self.eval_expr(expr, env));
            fields.insert(field.name.clone(), value);
            if field.mutability == FieldMutability::Val {
                immutable_fields.insert(field.name.clone());
            }
        }
        Ok(Flow::Value(Value::record(RecordInstance {
            name: decl.name.clone(),
            fields,
            immutable_fields,
        })))
    }
}

fn eval_binary(op: &str, left: Value, right: Value) -> Result<Value, RuntimeError> {
    let (Value::Int(l), Value::Int(r)) = (left, right) else {
        return Err(RuntimeError::BinaryOperands(op.to_string()));
    };
    let value = match op {
        "+" => l.wrapping_add(r),
        "-" => l.wrapping_sub(r),
        "*" => l.wrapping_mul(r),
        "/" => {
            if r == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            l.wrapping_div(r)
        }
        _ => return Err(RuntimeError::UnknownOperator(op.to_string())),
    };
    Ok(Value::Int(value))
}

fn array_index(index: &Value, len: usize) -> Result<usize, RuntimeError> {
    let Value::Int(i) = index else {
        return Err(RuntimeError::ArrayIndexType);
    };
    if *i < 0 || *i as usize >= len {
        return Err(RuntimeError::IndexOutOfRange { index: *i, len });
    }
    Ok(*i as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontend::parser::parse_source;
    use project::{resolve, Index};

    fn eval_src(src: &str) -> (Result<(), RuntimeError>, String) {
        let program = parse_source("<test>", src).unwrap();
        let symbols = resolve(&program, &Index::default()).unwrap();
        let mut out = Vec::new();
        let result = run_main(&symbols, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn run(src: &str) -> String {
        let (result, output) = eval_src(src);
        result.unwrap();
        output
    }

    fn run_err(src: &str) -> (RuntimeError, String) {
        let (result, output) = eval_src(src);
        (result.unwrap_err(), output)
    }

    #[test]
    fn arithmetic_and_print() {
        let output = run("fn main() { print 1 + 2 * 3 print 10 / 3 print 5 - 8 }");
        assert_eq!(output, "7\n3\n-3\n");
    }

    #[test]
    fn division_by_zero_emits_nothing() {
        let (err, output) = run_err("fn main() { print 10 / 0 }");
        assert_eq!(err.to_string(), "division by zero");
        assert_eq!(output, "");
    }

    #[test]
    fn binary_op_requires_ints() {
        let (err, _) = run_err(r#"fn main() { print 1 + "a" }"#);
        assert_eq!(err.to_string(), "binary op + expects ints");
    }

    #[test]
    fn undefined_variable() {
        let (err, _) = run_err("fn main() { print nope }");
        assert_eq!(err.to_string(), "undefined variable nope");
    }

    #[test]
    fn missing_main() {
        let program = parse_source("<test>", "fn helper() { }").unwrap();
        let symbols = resolve(&program, &Index::default()).unwrap();
        let mut out = Vec::new();
        let err = run_main(&symbols, &mut out).unwrap_err();
        assert!(matches!(err, RuntimeError::MissingMain));
    }

    #[test]
    fn call_and_return_value() {
        let output = run(
            r#"
            fn add(a: int, b: int) int { return a + b }
            fn main() { print add(2, 3) }
            "#,
        );
        assert_eq!(output, "5\n");
    }

    #[test]
    fn fallthrough_call_yields_null() {
        let output = run("fn noop() { }\nfn main() { print noop() }");
        assert_eq!(output, "null\n");
    }

    #[test]
    fn arity_mismatch() {
        let (err, _) = run_err("fn f(a: int) { }\nfn main() { f() }");
        assert_eq!(
            err.to_string(),
            "function f expects 1 argument(s) but received 0"
        );
    }

    #[test]
    fn return_unwinds_through_nested_blocks() {
        let output = run(
            r#"
            fn pick() int {
                if true {
                    if true { return 42 }
                    return 1
                } else { return 0 }
            }
            fn main() {
                print pick()
            }
            "#,
        );
        assert_eq!(output, "42\n");
    }

    #[test]
    fn statements_after_return_do_not_run() {
        let output = run(
            r#"
            fn main() {
                if true { return } else { return }
                print "unreachable"
            }
            "#,
        );
        assert_eq!(output, "");
    }

    #[test]
    fn return_signal_crosses_value_block_in_initializer() {
        let output = run(
            r#"
            fn f() int {
                val x = if true { return 7 } else { 0 }
                print x
                return 0
            }
            fn main() { print f() }
            "#,
        );
        assert_eq!(output, "7\n");
    }

    #[test]
    fn if_block_value_is_final_expression_statement() {
        let output = run("fn main() { val x = if true { 1 2 } print x }");
        assert_eq!(output, "2\n");
    }

    #[test]
    fn if_without_else_yields_null() {
        let output = run("fn main() { val x = if false { 1 } print x }");
        assert_eq!(output, "null\n");
    }

    #[test]
    fn block_ending_in_declaration_yields_null() {
        let output = run("fn main() { val x = if true { val q = 5 } print x }");
        assert_eq!(output, "null\n");
    }

    #[test]
    fn block_writes_do_not_leak() {
        let output = run(
            r#"
            fn main() {
                var x = 1
                val y = if true { x = 99 x }
                print x
                print y
            }
            "#,
        );
        assert_eq!(output, "1\n99\n");
    }

    #[test]
    fn if_condition_must_be_bool() {
        let (err, _) = run_err("fn main() { val x = if 1 { 2 } }");
        assert_eq!(err.to_string(), "if condition must be bool");
    }

    #[test]
    fn ternary_evaluates_only_selected_branch() {
        let output = run(
            r#"
            fn side() int { print "S" return 0 }
            fn main() { print true ? 1 : side() print false ? side() : 2 }
            "#,
        );
        assert_eq!(output, "1\n2\n");
    }

    #[test]
    fn elvis_short_circuits() {
        let output = run(
            r#"
            fn side() int { print "S" return 0 }
            fn main() {
                print 1 ?: side()
                print null ?: side()
            }
            "#,
        );
        assert_eq!(output, "1\nS\n0\n");
    }

    #[test]
    fn record_literal_and_field_access() {
        let output = run(
            r#"
            record Point { val x: int, var y: int }
            fn main() {
                val p = Point{x: 1, y: 2}
                print p.x
                print p
            }
            "#,
        );
        assert_eq!(output, "1\nPoint{x: 1, y: 2}\n");
    }

    #[test]
    fn record_literal_ignores_undeclared_fields_and_keeps_declared_order() {
        let output = run(
            r#"
            record Point { val x: int, var y: int }
            fn main() {
                val p = Point{y: 2, x: 1, z: 9}
                print p
            }
            "#,
        );
        assert_eq!(output, "Point{x: 1, y: 2}\n");
    }

    #[test]
    fn record_literal_missing_field() {
        let (err, _) = run_err(
            r#"
            record Point { val x: int, var y: int }
            fn main() { val p = Point{x: 1} }
            "#,
        );
        assert_eq!(err.to_string(), "missing field y");
    }

    #[test]
    fn immutable_field_assignment_is_rejected() {
        let (err, _) = run_err(
            r#"
            record P { val x: int, var y: int }
            fn main() {
                val p = P{x: 1, y: 2}
                p.x = 9
            }
            "#,
        );
        assert_eq!(err.to_string(), "field x is immutable");
    }

    #[test]
    fn mutable_field_assignment_succeeds() {
        let output = run(
            r#"
            record P { val x: int, var y: int }
            fn main() {
                val p = P{x: 1, y: 2}
                p.y = 9
                print p.y
            }
            "#,
        );
        assert_eq!(output, "9\n");
    }

    #[test]
    fn record_assignment_through_alias_is_shared() {
        let output = run(
            r#"
            record Cell { var v: int }
            fn bump(c: Cell) { c.v = c.v + 1 }
            fn main() {
                val a = Cell{v: 1}
                val b = a
                b.v = 9
                bump(a)
                print a.v
                print b.v
            }
            "#,
        );
        assert_eq!(output, "10\n10\n");
    }

    #[test]
    fn safe_field_access_on_null() {
        let output = run(
            r#"
            record U { val name: string }
            fn main() {
                val u = null
                print u?.name
                val v = U{name: "ada"}
                print v?.name
            }
            "#,
        );
        assert_eq!(output, "null\nada\n");
    }

    #[test]
    fn plain_field_access_on_null_is_an_error() {
        let (err, _) = run_err("fn main() { val u = null print u.name }");
        assert_eq!(err.to_string(), "field access on non-record");
    }

    #[test]
    fn arrays_allocate_index_and_render() {
        let output = run(
            r#"
            fn main() {
                val a = new int[3]
                a[0] = 7
                print a[0]
                print a[1]
                print a
            }
            "#,
        );
        assert_eq!(output, "7\nnull\n[7, null, null]\n");
    }

    #[test]
    fn array_index_out_of_range() {
        let (err, _) = run_err("fn main() { val a = new int[2] print a[5] }");
        assert_eq!(err.to_string(), "array index 5 out of range for length 2");
    }

    #[test]
    fn array_mutation_is_visible_through_aliases() {
        let output = run(
            r#"
            fn set_first(a: int[], v: int) { a[0] = v }
            fn main() {
                val a = new int[1]
                set_first(a, 5)
                print a[0]
            }
            "#,
        );
        assert_eq!(output, "5\n");
    }

    #[test]
    fn map_literal_overwrites_duplicate_keys() {
        let output = run(
            r#"
            fn main() {
                val m = map<string, int> { "a": 1, "b": 2, "a": 3 }
                print m["a"]
                print m
            }
            "#,
        );
        assert_eq!(output, "3\n{a: 3, b: 2}\n");
    }

    #[test]
    fn map_alloc_discards_capacity_and_starts_empty() {
        let output = run(
            r#"
            fn main() {
                val m = map<string, int>(64)
                print m
                m["k"] = 5
                print m["k"]
                print m["missing"]
            }
            "#,
        );
        assert_eq!(output, "{}\n5\nnull\n");
    }

    #[test]
    fn composite_map_key_is_rejected() {
        let (err, _) = run_err(
            r#"
            record P { val x: int }
            fn main() {
                val m = map<P, int>(0)
                m[P{x: 1}] = 2
            }
            "#,
        );
        assert_eq!(err.to_string(), "map key must be null, int, bool, or string");
    }

    #[test]
    fn index_access_on_non_collection() {
        let (err, _) = run_err("fn main() { print 5[0] }");
        assert_eq!(err.to_string(), "index access on non-collection");
    }

    #[test]
    fn invalid_assignment_target() {
        let (err, _) = run_err("fn main() { 1 + 2 = 3 }");
        assert_eq!(err.to_string(), "invalid assignment target");
    }

    #[test]
    fn declaration_mutability_is_not_enforced_on_rebinding() {
        let output = run("fn main() { val x = 1 x = 2 print x }");
        assert_eq!(output, "2\n");
    }

    #[test]
    fn match_bindings_do_not_leak_into_outer_scope() {
        let output = run(
            r#"
            record User { var name: string }
            fn main() {
                val name = "outer"
                val u = User{name: "inner"}
                val result = match u {
                    User{name: name} => name,
                    else => "none"
                }
                print name
                print result
            }
            "#,
        );
        assert_eq!(output, "outer\ninner\n");
    }

    #[test]
    fn match_literal_and_wildcard_cases() {
        let output = run(
            r#"
            fn label(v: int) string {
                return match v {
                    42 => "answer",
                    _ => "other"
                }
            }
            fn main() {
                print label(42)
                print label(7)
            }
            "#,
        );
        assert_eq!(output, "answer\nother\n");
    }

    #[test]
    fn match_falls_back_to_else() {
        let output = run(
            r#"
            record A { val v: int }
            record B { val v: int }
            fn main() {
                val b = B{v: 1}
                print match b { A{v: v} => v, else => "none" }
            }
            "#,
        );
        assert_eq!(output, "none\n");
    }

    #[test]
    fn match_without_else_exhausting_cases_fails() {
        let (err, _) = run_err("fn main() { val r = match 1 { 2 => 3 } }");
        assert_eq!(err.to_string(), "match expression missing else branch");
    }

    #[test]
    fn match_scrutinee_is_evaluated_once() {
        let output = run(
            r#"
            fn probe() int { print "eval" return 1 }
            fn main() {
                print match probe() { 1 => "one", else => "other" }
            }
            "#,
        );
        assert_eq!(output, "eval\none\n");
    }

    #[test]
    fn overlapping_match_bindings_keep_leftmost() {
        let output = run(
            r#"
            record Pair { val a: int, val b: int }
            fn main() {
                val p = Pair{a: 1, b: 2}
                print match p { Pair{a: x, b: x} => x, else => 0 }
            }
            "#,
        );
        assert_eq!(output, "1\n");
    }

    #[test]
    fn variant_pattern_is_reserved_and_never_matches() {
        let output = run(
            r#"
            fn main() {
                print match 1 { Shape.Circle(r) => r, else => "reserved" }
            }
            "#,
        );
        assert_eq!(output, "reserved\n");
    }
}
