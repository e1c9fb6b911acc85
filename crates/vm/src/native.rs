//! Native function bridge.
//!
//! A native is host code invoked by `CALL` with the native flag set. It
//! runs synchronously inside the dispatch loop with direct access to the
//! live register bank; no frame is pushed and no result register is
//! assigned, so any value a native hands back must be written into a
//! register agreed on with the caller.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use jnvm_common::Value;
use tracing::debug;

use crate::error::NativeError;
use crate::registers::{Bank, REGISTER_COUNT};

/// Identifier of a native function.
///
/// Only identifiers up to `0x7FFF` can be reached from bytecode; the
/// remaining bit of a CALL's target field selects the native table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(pub u16);

impl NativeId {
    /// Built-in value/string printer.
    pub const PRINT: NativeId = NativeId(0);
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arguments of one native invocation.
pub struct NativeCall<'a> {
    /// The live register bank.
    pub registers: &'a mut Bank,
    /// First register of the argument window.
    pub base: u8,
    /// Number of arguments in the window.
    pub argc: u8,
    /// The loaded string table.
    pub strings: &'a [String],
}

impl<'a> NativeCall<'a> {
    /// The argument window, clipped to the end of the bank.
    pub fn args(&self) -> &[u32] {
        let start = self.base as usize;
        let end = (start + self.argc as usize).min(REGISTER_COUNT);
        &self.registers[start..end]
    }

    /// Resolve an argument word to display text.
    ///
    /// Numbers are formatted in decimal; string references are looked up
    /// in the table.
    pub fn render(&self, word: u32) -> Result<String, NativeError> {
        match Value::from_word(word) {
            Value::Number(n) => Ok(n.to_string()),
            value @ Value::Str(index) => value
                .resolve(self.strings)
                .map(str::to_string)
                .ok_or(NativeError::StringIndexOutOfBounds {
                    index,
                    len: self.strings.len(),
                }),
        }
    }
}

/// A host function callable from bytecode.
pub trait Native: 'static {
    fn call(&mut self, call: NativeCall<'_>) -> Result<(), NativeError>;
}

impl<F> Native for F
where
    F: for<'a> FnMut(NativeCall<'a>) -> Result<(), NativeError> + 'static,
{
    fn call(&mut self, call: NativeCall<'_>) -> Result<(), NativeError> {
        self(call)
    }
}

/// Identifier → native binding table.
#[derive(Default)]
pub struct NativeTable {
    entries: HashMap<NativeId, Box<dyn Native>>,
}

impl NativeTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the built-in natives, printing to stdout.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register(NativeId::PRINT, Print::stdout());
        table
    }

    /// Insert or overwrite the binding for `id`.
    pub fn register(&mut self, id: NativeId, native: impl Native) {
        self.entries.insert(id, Box::new(native));
    }

    pub fn get_mut(&mut self, id: NativeId) -> Option<&mut (dyn Native + 'static)> {
        self.entries.get_mut(&id).map(|b| b.as_mut())
    }

    pub fn contains(&self, id: NativeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Registered identifiers in ascending order.
    pub fn ids(&self) -> Vec<NativeId> {
        let mut ids: Vec<NativeId> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl fmt::Debug for NativeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeTable")
            .field("ids", &self.ids())
            .finish()
    }
}

/// The built-in `print` native.
///
/// Writes every argument, space separated, followed by a newline. String
/// references are resolved through the string table; a reference past the
/// end of the table is skipped and the remaining arguments still print.
pub struct Print<W> {
    out: W,
}

impl<W: Write> Print<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl Print<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + 'static> Native for Print<W> {
    fn call(&mut self, call: NativeCall<'_>) -> Result<(), NativeError> {
        let parts: Vec<String> = call
            .args()
            .iter()
            .filter_map(|&word| match call.render(word) {
                Ok(text) => Some(text),
                Err(e) => {
                    debug!(error = %e, "print: skipping argument");
                    None
                }
            })
            .collect();
        writeln!(self.out, "{}", parts.join(" "))?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jnvm_common::value::tag;

    fn strings() -> Vec<String> {
        vec!["hello".to_string(), "world".to_string()]
    }

    #[test]
    fn args_window() {
        let mut regs = [0u32; REGISTER_COUNT];
        regs[3] = 1;
        regs[4] = 2;
        regs[5] = 3;
        let strings = strings();
        let call = NativeCall {
            registers: &mut regs,
            base: 3,
            argc: 2,
            strings: &strings,
        };
        assert_eq!(call.args(), &[1, 2]);
    }

    #[test]
    fn args_window_is_clipped_at_bank_end() {
        let mut regs = [7u32; REGISTER_COUNT];
        let strings = strings();
        let call = NativeCall {
            registers: &mut regs,
            base: 254,
            argc: 10,
            strings: &strings,
        };
        assert_eq!(call.args().len(), 2);
    }

    #[test]
    fn print_resolves_strings_and_numbers() {
        let mut regs = [0u32; REGISTER_COUNT];
        regs[0] = tag(0);
        regs[1] = 42;
        regs[2] = tag(1);
        let strings = strings();

        let mut print = Print::new(Vec::new());
        print
            .call(NativeCall {
                registers: &mut regs,
                base: 0,
                argc: 3,
                strings: &strings,
            })
            .unwrap();
        assert_eq!(String::from_utf8(print.out).unwrap(), "hello 42 world\n");
    }

    #[test]
    fn print_with_no_args_writes_empty_line() {
        let mut regs = [0u32; REGISTER_COUNT];
        let mut print = Print::new(Vec::new());
        print
            .call(NativeCall {
                registers: &mut regs,
                base: 0,
                argc: 0,
                strings: &[],
            })
            .unwrap();
        assert_eq!(print.out, b"\n");
    }

    #[test]
    fn print_skips_dangling_reference() {
        let mut regs = [0u32; REGISTER_COUNT];
        regs[0] = tag(5);
        regs[1] = 7;
        regs[2] = tag(1);
        let strings = strings();
        let mut print = Print::new(Vec::new());
        print
            .call(NativeCall {
                registers: &mut regs,
                base: 0,
                argc: 3,
                strings: &strings,
            })
            .unwrap();
        assert_eq!(String::from_utf8(print.out).unwrap(), "7 world\n");
    }

    #[test]
    fn render_reports_dangling_reference() {
        let mut regs = [0u32; REGISTER_COUNT];
        let strings = strings();
        let call = NativeCall {
            registers: &mut regs,
            base: 0,
            argc: 0,
            strings: &strings,
        };
        assert_eq!(
            call.render(tag(5)),
            Err(NativeError::StringIndexOutOfBounds { index: 5, len: 2 })
        );
    }

    #[test]
    fn table_register_and_overwrite() {
        let mut table = NativeTable::with_builtins();
        assert!(table.contains(NativeId::PRINT));
        assert!(!table.contains(NativeId(7)));

        table.register(NativeId(7), |_call: NativeCall<'_>| -> Result<(), NativeError> {
            Ok(())
        });
        table.register(NativeId(7), |_call: NativeCall<'_>| -> Result<(), NativeError> {
            Err(NativeError::Failed("replaced".to_string()))
        });
        assert_eq!(table.ids(), vec![NativeId(0), NativeId(7)]);

        let mut regs = [0u32; REGISTER_COUNT];
        let result = table.get_mut(NativeId(7)).unwrap().call(NativeCall {
            registers: &mut regs,
            base: 0,
            argc: 0,
            strings: &[],
        });
        assert_eq!(result, Err(NativeError::Failed("replaced".to_string())));
    }

    #[test]
    fn closures_can_write_registers() {
        let mut double = |mut call: NativeCall<'_>| -> Result<(), NativeError> {
            let base = call.base as usize;
            call.registers[base] = call.registers[base].wrapping_mul(2);
            Ok(())
        };
        let mut regs = [0u32; REGISTER_COUNT];
        regs[9] = 21;
        Native::call(
            &mut double,
            NativeCall {
                registers: &mut regs,
                base: 9,
                argc: 1,
                strings: &[],
            },
        )
        .unwrap();
        assert_eq!(regs[9], 42);
    }
}
