// ABOUTME: The embedding surface — heap ownership, call stack, and last-error slot

use crate::error::{ErrorKind, FrameSnapshot, LispError, LResult};
use crate::eval::{self, Frame};
use crate::gc;
use crate::heap::{Heap, ObjRef};
use crate::reader;
use std::io::{Read, Write};

/// Owns a heap, its default global scope, the active call stack, and the
/// last error raised by a core operation. One `Runtime` corresponds to one
/// independent interpreter instance; two may coexist as long as no `ObjRef`
/// crosses between them.
pub struct Runtime {
    pub heap: Heap,
    global_scope: ObjRef,
    call_stack: Vec<Frame>,
    last_error: Option<LispError>,
}

impl Runtime {
    /// `runtime_new` plus `new_default_scope`: a fresh heap with a global
    /// scope preloaded with every builtin in `builtins::register_all`.
    pub fn new() -> Self {
        let mut heap = Heap::new();
        let global_scope = crate::env::new_scope(&mut heap, None);
        crate::builtins::register_all(&mut heap, global_scope);
        Runtime {
            heap,
            global_scope,
            call_stack: Vec::new(),
            last_error: None,
        }
    }

    pub fn global_scope(&self) -> ObjRef {
        self.global_scope
    }

    pub(crate) fn push_frame(&mut self, frame: Frame) {
        self.call_stack.push(frame);
    }

    pub(crate) fn pop_frame(&mut self) {
        self.call_stack.pop();
    }

    fn stack_snapshot(&self) -> Vec<FrameSnapshot> {
        self.call_stack
            .iter()
            .map(|f| FrameSnapshot {
                callable: self.heap.to_display_string(f.callable),
                args: f
                    .args
                    .iter()
                    .map(|&a| self.heap.to_display_string(a))
                    .collect::<Vec<_>>()
                    .join(" "),
            })
            .collect()
    }

    /// Records `err`, stamping it with the current call stack, as the
    /// runtime's last error. Returns it unchanged so callers can
    /// `.map_err(|e| rt.record_error(e))?` in one step.
    fn record_error(&mut self, err: LispError) -> LispError {
        let err = err.with_stack(self.stack_snapshot());
        self.last_error = Some(err.clone());
        err
    }

    /// Parses a single expression starting at `offset` bytes into `input`.
    /// Returns the value and the number of bytes consumed.
    pub fn parse_value(&mut self, input: &str, offset: usize) -> Result<(ObjRef, usize), LispError> {
        reader::parse_value(&mut self.heap, input, offset).map_err(|e| self.record_error(e))
    }

    /// Parses every top-level expression in `input` and wraps them in a
    /// `(progn …)` so evaluating the result runs them in order and returns
    /// the value of the last.
    pub fn parse_program(&mut self, input: &str) -> Result<ObjRef, LispError> {
        reader::parse_program(&mut self.heap, input).map_err(|e| self.record_error(e))
    }

    /// Reads `stream` to completion, then parses it as `parse_program`
    /// does. Reports `ferror` on I/O failure.
    pub fn parse_program_from_stream(&mut self, stream: &mut dyn Read) -> Result<ObjRef, LispError> {
        let mut buf = String::new();
        if stream.read_to_string(&mut buf).is_err() {
            return Err(self.record_error(LispError::new(ErrorKind::Ferror, "error reading from input stream")));
        }
        self.parse_program(&buf)
    }

    /// Evaluates `expr` in `scope`.
    pub fn eval(&mut self, scope: ObjRef, expr: ObjRef) -> LResult {
        eval::eval(self, scope, expr).map_err(|e| self.record_error(e))
    }

    /// Invokes `callable` with already-prepared `args`, bypassing `eval`'s
    /// evaluate-args dispatch entirely.
    pub fn call(&mut self, scope: ObjRef, callable: ObjRef, args: &[ObjRef]) -> LResult {
        eval::apply(self, scope, callable, args).map_err(|e| self.record_error(e))
    }

    /// Reads `stream` to completion, parses it as a program, and evaluates
    /// it in `scope`.
    pub fn load_file(&mut self, scope: ObjRef, stream: &mut dyn Read) -> LResult {
        let program = self.parse_program_from_stream(stream)?;
        self.eval(scope, program)
    }

    pub fn print_value(&self, sink: &mut dyn Write, value: ObjRef) -> std::io::Result<()> {
        write!(sink, "{}", self.heap.to_display_string(value))
    }

    /// Writes the last error's kind, message, and line (if any) to `sink`.
    /// A no-op if there is no pending error.
    pub fn print_error(&self, sink: &mut dyn Write) -> std::io::Result<()> {
        if let Some(err) = &self.last_error {
            match err.line {
                Some(line) => writeln!(sink, "{}: {} (line {})", err.kind, err.message, line),
                None => writeln!(sink, "{}: {}", err.kind, err.message),
            }
        } else {
            Ok(())
        }
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn last_error(&self) -> Option<&LispError> {
        self.last_error.as_ref()
    }

    /// Prints the active call stack, innermost frame last, to `sink`.
    pub fn dump_stack(&self, sink: &mut dyn Write) {
        for (depth, frame) in self.call_stack.iter().enumerate() {
            let args = frame
                .args
                .iter()
                .map(|&a| self.heap.to_display_string(a))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(
                sink,
                "#{}: ({} {})",
                depth,
                self.heap.to_display_string(frame.callable),
                args
            );
        }
    }

    /// Marks every value reachable from the global scope, the nil
    /// singleton (always rooted, per spec — it is never freed), the call
    /// stack's callables and arguments, plus any extra `roots` the
    /// embedder supplies (e.g. intermediate results held only on the host
    /// stack).
    pub fn mark(&mut self, roots: &[ObjRef]) {
        let mut all_roots: Vec<ObjRef> = vec![self.global_scope, self.heap.nil()];
        for frame in &self.call_stack {
            all_roots.push(frame.callable);
            all_roots.extend(frame.args.iter().copied());
        }
        all_roots.extend(roots.iter().copied());
        gc::mark(&mut self.heap, &all_roots);
    }

    pub fn sweep(&mut self) {
        gc::sweep(&mut self.heap);
    }

    /// Convenience combining `mark` and `sweep`, matching the common
    /// REPL-granularity collection point.
    pub fn collect(&mut self, roots: &[ObjRef]) {
        self.mark(roots);
        self.sweep();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
