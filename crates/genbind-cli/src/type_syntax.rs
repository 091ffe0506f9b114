//! Surface syntax for type expressions.
//!
//! | Form | Example |
//! |------|---------|
//! | Named type or type parameter | `string`, `T`, `void*` |
//! | Instantiation | `Dictionary<string, List<int>>` |
//! | Array | `int[]`, `int[,]`, `string[][]` |
//!
//! Names resolve against the type parameters in scope first, then against
//! the catalog's declared types. Instantiations and arrays are interned
//! into the store as they are parsed.

use anyhow::{Context, Result, bail};
use genbind_solver::{TypeCatalog, TypeId, TypeStore};

/// Type parameters visible while parsing, by name.
pub type Scope = [(String, TypeId)];

/// Parse a complete type expression.
pub fn parse_type(store: &mut TypeStore, text: &str, scope: &Scope) -> Result<TypeId> {
    let mut parser = TypeParser {
        text,
        pos: 0,
        store,
        scope,
    };
    let ty = parser.ty()?;
    parser.skip_whitespace();
    if parser.pos < text.len() {
        bail!("unexpected `{}` in type `{text}`", &text[parser.pos..]);
    }
    Ok(ty)
}

struct TypeParser<'a> {
    text: &'a str,
    pos: usize,
    store: &'a mut TypeStore,
    scope: &'a Scope,
}

impl TypeParser<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if !self.eat(expected) {
            bail!(
                "expected `{expected}` at offset {} in type `{}`",
                self.pos,
                self.text
            );
        }
        Ok(())
    }

    fn name(&mut self) -> Result<String> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || matches!(c, '_' | '.' | '*')) {
                break;
            }
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            bail!(
                "expected a type name at offset {start} in type `{}`",
                self.text
            );
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn ty(&mut self) -> Result<TypeId> {
        let name = self.name()?;
        let mut ty = if self.eat('<') {
            let mut args = vec![self.ty()?];
            while self.eat(',') {
                args.push(self.ty()?);
            }
            self.expect('>')?;
            self.instantiate(&name, &args)?
        } else {
            self.resolve(&name)?
        };

        while self.eat('[') {
            let mut rank = 1;
            while self.eat(',') {
                rank += 1;
            }
            self.expect(']')?;
            ty = self.store.array_of(ty, rank);
        }
        Ok(ty)
    }

    fn resolve(&self, name: &str) -> Result<TypeId> {
        if let Some((_, ty)) = self.scope.iter().find(|(param, _)| param == name) {
            return Ok(*ty);
        }
        self.store
            .lookup(name)
            .with_context(|| format!("unknown type `{name}`"))
    }

    fn instantiate(&mut self, name: &str, args: &[TypeId]) -> Result<TypeId> {
        let definition = self.resolve(name)?;
        if self.store.generic_definition(definition) != Some(definition) {
            bail!("`{name}` is not a generic type");
        }
        let arity = self.store.generic_arguments(definition).len();
        if arity != args.len() {
            bail!(
                "`{name}` takes {arity} type argument(s), got {}",
                args.len()
            );
        }
        Ok(self.store.instantiate(definition, args))
    }
}
