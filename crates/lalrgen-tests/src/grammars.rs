//! Grammar definitions for integration tests.

use lalrgen::grammar::{
    Assoc, GrammarDef, GrammarDefError, NonterminalID, Precedence, SymbolID, SymbolID::*,
};

type Result = std::result::Result<(), GrammarDefError>;

/// Add one production of `left` per alternative.
fn rules(g: &mut GrammarDef, left: NonterminalID, alternatives: &[&[SymbolID]]) -> Result {
    for right in alternatives {
        g.rule(left, right.iter().copied(), None)?;
    }
    Ok(())
}

/// `S -> a S b | ε`
pub fn g_balanced(g: &mut GrammarDef) -> Result {
    let a = g.terminal("a", None)?;
    let b = g.terminal("b", None)?;
    let s = g.nonterminal("S")?;

    rules(g, s, &[&[T(a), N(s), T(b)], &[]])
}

/// `E -> E '+' E | E '*' E | num`, with `*` binding tighter than `+`.
pub fn g_arith_prec(g: &mut GrammarDef) -> Result {
    let plus = g.terminal("'+'", Some(Precedence::new(1, Assoc::Left)))?;
    let star = g.terminal("'*'", Some(Precedence::new(2, Assoc::Left)))?;
    let num = g.terminal("num", None)?;
    let e = g.nonterminal("E")?;

    rules(
        g,
        e,
        &[
            &[N(e), T(plus), N(e)], // E '+' E
            &[N(e), T(star), N(e)], // E '*' E
            &[T(num)],              // num
        ],
    )
}

/// The same expressions as [`g_arith_prec`] without any precedence.
pub fn g_arith_ambiguous(g: &mut GrammarDef) -> Result {
    let plus = g.terminal("'+'", None)?;
    let star = g.terminal("'*'", None)?;
    let num = g.terminal("num", None)?;
    let e = g.nonterminal("E")?;

    rules(
        g,
        e,
        &[
            &[N(e), T(plus), N(e)],
            &[N(e), T(star), N(e)],
            &[T(num)],
        ],
    )
}

/// `S -> if E then S | if E then S else S | other`
pub fn g_dangling_else(g: &mut GrammarDef) -> Result {
    let t_if = g.terminal("IF", None)?;
    let t_then = g.terminal("THEN", None)?;
    let t_else = g.terminal("ELSE", None)?;
    let other = g.terminal("OTHER", None)?;
    let cond = g.terminal("COND", None)?;

    let s = g.nonterminal("S")?;
    let e = g.nonterminal("E")?;

    g.start_symbol(s)?;

    rules(
        g,
        s,
        &[
            &[T(t_if), N(e), T(t_then), N(s)],
            &[T(t_if), N(e), T(t_then), N(s), T(t_else), N(s)],
            &[T(other)],
        ],
    )?;
    rules(g, e, &[&[T(cond)]])
}

pub fn g_simple1(g: &mut GrammarDef) -> Result {
    let equal = g.terminal("EQUAL", None)?;
    let plus = g.terminal("PLUS", None)?;
    let ident = g.terminal("ID", None)?;
    let num = g.terminal("NUM", None)?;

    let a = g.nonterminal("A")?;
    let e = g.nonterminal("E")?;
    let t = g.nonterminal("T")?;

    g.start_symbol(a)?;

    rules(g, a, &[&[N(e), T(equal), N(e)], &[T(ident)]])?;
    rules(g, e, &[&[N(e), T(plus), N(t)], &[N(t)]])?;
    rules(g, t, &[&[T(num)], &[T(ident)]])
}

pub fn g_simple2(g: &mut GrammarDef) -> Result {
    // declare terminal symbols.
    let lparen = g.terminal("LPAREN", None)?;
    let rparen = g.terminal("RPAREN", None)?;
    let plus = g.terminal("PLUS", None)?;
    let minus = g.terminal("MINUS", None)?;
    let star = g.terminal("STAR", None)?;
    let slash = g.terminal("SLASH", None)?;
    let num = g.terminal("NUM", None)?;

    // declare nonterminal symbols.
    let expr = g.nonterminal("EXPR")?;
    let factor = g.nonterminal("FACTOR")?;
    let term = g.nonterminal("TERM")?;

    g.start_symbol(expr)?;

    rules(
        g,
        expr,
        &[
            &[N(expr), T(plus), N(factor)],  // expr '+' factor
            &[N(expr), T(minus), N(factor)], // expr '-' factor
            &[N(factor)],                    // factor
        ],
    )?;
    rules(
        g,
        factor,
        &[
            &[N(factor), T(star), N(term)],  // factor '*' term
            &[N(factor), T(slash), N(term)], // factor '/' term
            &[N(term)],                      // term
        ],
    )?;
    rules(
        g,
        term,
        &[
            &[T(num)],                         // num
            &[T(lparen), N(expr), T(rparen)], // '(' expr ')'
        ],
    )
}

/// Nullable chains: `S -> A B c`, `A -> a A | ε`, `B -> b B | C`, `C -> ε`.
pub fn g_nullable_chain(g: &mut GrammarDef) -> Result {
    let a = g.terminal("a", None)?;
    let b = g.terminal("b", None)?;
    let c = g.terminal("c", None)?;

    let s = g.nonterminal("S")?;
    let x = g.nonterminal("A")?;
    let y = g.nonterminal("B")?;
    let z = g.nonterminal("C")?;

    g.start_symbol(s)?;

    rules(g, s, &[&[N(x), N(y), T(c)]])?;
    rules(g, x, &[&[T(a), N(x)], &[]])?;
    rules(g, y, &[&[T(b), N(y)], &[N(z)]])?;
    rules(g, z, &[&[]])
}

/// A statement list recovering from errors at `;`.
pub fn g_error_recovery(g: &mut GrammarDef) -> Result {
    let ident = g.terminal("ID", None)?;
    let semicolon = g.terminal("SEMICOLON", None)?;
    let error = lalrgen::grammar::TerminalID::ERROR;

    let list = g.nonterminal("LIST")?;
    let stmt = g.nonterminal("STMT")?;

    g.start_symbol(list)?;

    rules(g, list, &[&[N(list), N(stmt)], &[]])?;
    rules(
        g,
        stmt,
        &[&[T(ident), T(semicolon)], &[T(error), T(semicolon)]],
    )
}

// E → E + T | T
// T → ( E ) | n
pub fn g4(g: &mut GrammarDef) -> Result {
    let plus = g.terminal("PLUS", None)?;
    let lparen = g.terminal("LPAREN", None)?;
    let rparen = g.terminal("RPAREN", None)?;
    let num = g.terminal("NUM", None)?;

    let e = g.nonterminal("E")?;
    let t = g.nonterminal("T")?;

    rules(g, e, &[&[N(e), T(plus), N(t)], &[N(t)]])?;
    rules(g, t, &[&[T(lparen), N(e), T(rparen)], &[T(num)]])
}

pub fn min_caml(g: &mut GrammarDef) -> Result {
    let prec = |priority, assoc| Some(Precedence::new(priority, assoc));

    let l_paren = g.terminal("LPAREN", None)?;
    let r_paren = g.terminal("RPAREN", None)?;
    let t_true = g.terminal("TRUE", None)?;
    let t_false = g.terminal("FALSE", None)?;
    let integer = g.terminal("INTEGER", None)?;
    let float = g.terminal("FLOAT", None)?;
    let ident = g.terminal("IDENT", None)?;
    let t_in = g.terminal("IN", prec(1, Assoc::Right))?;
    let semicolon = g.terminal("SEMICOLON", prec(2, Assoc::Right))?;
    let less_minus = g.terminal("LESS_MINUS", prec(3, Assoc::Right))?;
    let t_else = g.terminal("ELSE", prec(4, Assoc::Right))?;
    let comma = g.terminal("COMMA", prec(5, Assoc::Left))?;
    let equal = g.terminal("EQUAL", prec(6, Assoc::Left))?;
    let less_greater = g.terminal("LESS_GREATER", prec(6, Assoc::Left))?;
    let less = g.terminal("LESS", prec(6, Assoc::Left))?;
    let greater = g.terminal("GREATER", prec(6, Assoc::Left))?;
    let less_equal = g.terminal("LESS_EQUAL", prec(6, Assoc::Left))?;
    let greater_equal = g.terminal("GREATER_EQUAL", prec(6, Assoc::Left))?;
    let plus = g.terminal("PLUS", prec(7, Assoc::Left))?;
    let minus = g.terminal("MINUS", prec(7, Assoc::Left))?;
    let plus_dot = g.terminal("PLUS_DOT", prec(7, Assoc::Left))?;
    let minus_dot = g.terminal("MINUS_DOT", prec(7, Assoc::Left))?;
    let star_dot = g.terminal("STAR_DOT", prec(8, Assoc::Left))?;
    let slash_dot = g.terminal("SLASH_DOT", prec(8, Assoc::Left))?;
    let t_not = g.terminal("NOT", None)?;
    let t_if = g.terminal("IF", None)?;
    let t_then = g.terminal("THEN", None)?;
    let t_let = g.terminal("LET", None)?;
    let t_rec = g.terminal("REC", None)?;
    let array_make = g.terminal("ARRAY_MAKE", None)?;
    let dot = g.terminal("DOT", prec(10, Assoc::Left))?;

    let exp = g.nonterminal("EXP")?;
    let simple_exp = g.nonterminal("SIMPLE_EXP")?;
    let fundef = g.nonterminal("FUNDEF")?;
    let formal_args = g.nonterminal("FORMAL_ARGS")?;
    let actual_args = g.nonterminal("ACTUAL_ARGS")?;
    let elems = g.nonterminal("ELEMS")?;
    let pat = g.nonterminal("PAT")?;

    g.start_symbol(exp)?;

    rules(
        g,
        simple_exp,
        &[
            &[T(l_paren), N(exp), T(r_paren)],
            &[T(l_paren), T(r_paren)],
            &[T(t_true)],
            &[T(t_false)],
            &[T(integer)],
            &[T(float)],
            &[T(ident)],
            &[N(simple_exp), T(dot), T(l_paren), N(exp), T(r_paren)],
        ],
    )?;

    let binary = [
        plus,
        minus,
        plus_dot,
        minus_dot,
        star_dot,
        slash_dot,
        equal,
        less_greater,
        less,
        greater,
        less_equal,
        greater_equal,
    ];
    rules(g, exp, &[&[N(simple_exp)], &[T(t_not), N(exp)], &[T(minus), N(exp)]])?;
    for op in binary {
        g.rule(exp, [N(exp), T(op), N(exp)], None)?;
    }
    rules(
        g,
        exp,
        &[
            &[T(t_if), N(exp), T(t_then), N(exp), T(t_else), N(exp)],
            &[T(t_let), T(ident), T(equal), N(exp), T(t_in), N(exp)],
            &[T(t_let), T(t_rec), N(fundef), T(t_in), N(exp)],
            &[N(simple_exp), N(actual_args)],
            &[N(elems)],
            &[T(t_let), T(l_paren), N(pat), T(r_paren), T(equal), N(exp), T(t_in), N(exp)],
            &[
                N(simple_exp),
                T(dot),
                T(l_paren),
                N(exp),
                T(r_paren),
                T(less_minus),
                N(exp),
            ],
            &[N(exp), T(semicolon), N(exp)],
            &[T(array_make), N(simple_exp), N(simple_exp)],
        ],
    )?;

    rules(g, fundef, &[&[T(ident), N(formal_args), T(equal), N(exp)]])?;
    rules(g, formal_args, &[&[T(ident), N(formal_args)], &[T(ident)]])?;
    rules(
        g,
        actual_args,
        &[&[N(actual_args), N(simple_exp)], &[N(simple_exp)]],
    )?;
    rules(
        g,
        elems,
        &[&[N(elems), T(comma), N(exp)], &[N(exp), T(comma), N(exp)]],
    )?;
    rules(
        g,
        pat,
        &[&[N(pat), T(comma), T(ident)], &[T(ident), T(comma), T(ident)]],
    )
}
