//! QuickJS-backed beautify engine with a single serialized execution thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use rquickjs::{Context, Function, Runtime, Value};

use crate::config::constants::{BEAUTIFY_SYMBOL, ENGINE_MEMORY_LIMIT};
use crate::error_handling::EngineError;

/// The bundled beautify routine, embedded at compile time.
const BEAUTIFY_SOURCE: &str = include_str!("beautify.js");

struct BeautifyRequest {
    source: String,
    reply: Sender<Result<String, EngineError>>,
}

/// Handle to the single embedded beautify interpreter.
///
/// The QuickJS runtime and context live on a dedicated thread spawned by
/// [`BeautifyEngine::initialize`]; callers communicate over a channel, so
/// the non-reentrant evaluation context is only ever touched by that one
/// thread regardless of how many workers call [`beautify`](Self::beautify)
/// concurrently. This serialization point is the pipeline's throughput
/// bottleneck by design.
pub struct BeautifyEngine {
    requests: Option<Sender<BeautifyRequest>>,
    worker: Option<JoinHandle<()>>,
    invocations: Arc<AtomicU64>,
}

impl BeautifyEngine {
    /// Starts the engine thread, evaluates the bundled routine, and
    /// verifies the `beautify` symbol is callable.
    ///
    /// # Errors
    ///
    /// Fails fast with an [`EngineError`] if the interpreter cannot be
    /// created or the bundled routine does not load. This is a startup
    /// precondition: the caller must refuse to become ready, no per-request
    /// recovery is attempted.
    pub fn initialize() -> Result<Self, EngineError> {
        let (request_tx, request_rx) = unbounded::<BeautifyRequest>();
        let (ready_tx, ready_rx) = bounded::<Result<(), EngineError>>(1);
        let invocations = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&invocations);

        let worker = thread::Builder::new()
            .name("beautify-engine".into())
            .spawn(move || engine_loop(request_rx, ready_tx, counter))
            .map_err(|e| EngineError::RuntimeCreation(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                log::debug!("Beautify engine initialized");
                Ok(BeautifyEngine {
                    requests: Some(request_tx),
                    worker: Some(worker),
                    invocations,
                })
            }
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => {
                let _ = worker.join();
                Err(EngineError::EngineStopped)
            }
        }
    }

    /// Beautifies a JavaScript source.
    ///
    /// Blank input returns an empty string without contacting the engine
    /// thread at all. Otherwise the call blocks until the engine thread has
    /// processed the request; a JS exception or a non-string result yields
    /// an error, never a crash.
    pub fn beautify(&self, source: &str) -> Result<String, EngineError> {
        if source.trim().is_empty() {
            return Ok(String::new());
        }

        let requests = self.requests.as_ref().ok_or(EngineError::EngineStopped)?;
        let (reply_tx, reply_rx) = bounded(1);
        requests
            .send(BeautifyRequest {
                source: source.to_owned(),
                reply: reply_tx,
            })
            .map_err(|_| EngineError::EngineStopped)?;
        reply_rx.recv().map_err(|_| EngineError::EngineStopped)?
    }

    /// Number of times the embedded routine has actually been invoked.
    ///
    /// Blank inputs short-circuit before the engine and do not count.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Stops the engine thread after it drains any queued requests.
    pub fn shutdown(&mut self) {
        self.requests.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("Beautify engine thread panicked during shutdown");
            }
        }
    }
}

impl Drop for BeautifyEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn engine_loop(
    requests: Receiver<BeautifyRequest>,
    ready: Sender<Result<(), EngineError>>,
    invocations: Arc<AtomicU64>,
) {
    // The runtime must stay alive for as long as the context is used.
    let (_runtime, context) = match initialize_interpreter() {
        Ok(parts) => {
            let _ = ready.send(Ok(()));
            parts
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    for request in requests {
        invocations.fetch_add(1, Ordering::Relaxed);
        let result = run_beautify(&context, &request.source);
        if let Err(ref e) = result {
            log::error!("Beautify invocation failed: {e}");
        }
        if request.reply.send(result).is_err() {
            log::debug!("Beautify caller went away before receiving the result");
        }
    }
}

fn initialize_interpreter() -> Result<(Runtime, Context), EngineError> {
    let runtime = Runtime::new().map_err(|e| EngineError::RuntimeCreation(e.to_string()))?;
    runtime.set_memory_limit(ENGINE_MEMORY_LIMIT);

    let context =
        Context::full(&runtime).map_err(|e| EngineError::ContextCreation(e.to_string()))?;

    context.with(|ctx| {
        ctx.eval::<Value, _>(BEAUTIFY_SOURCE)
            .map_err(|e| EngineError::ResourceEval(describe_js_error(&ctx, e)))?;

        let symbol: Value = ctx
            .globals()
            .get(BEAUTIFY_SYMBOL)
            .map_err(|_| EngineError::SymbolNotCallable)?;
        if !symbol.is_function() {
            return Err(EngineError::SymbolNotCallable);
        }
        Ok(())
    })?;

    Ok((runtime, context))
}

fn run_beautify(context: &Context, source: &str) -> Result<String, EngineError> {
    context.with(|ctx| {
        let function: Function = ctx
            .globals()
            .get(BEAUTIFY_SYMBOL)
            .map_err(|_| EngineError::SymbolNotCallable)?;

        let value: Value = function
            .call((source,))
            .map_err(|e| EngineError::Invocation(describe_js_error(&ctx, e)))?;

        match value.into_string() {
            Some(result) => result
                .to_string()
                .map_err(|e| EngineError::Invocation(e.to_string())),
            None => Err(EngineError::NonStringResult),
        }
    })
}

/// Renders a QuickJS error, pulling the pending exception value out of the
/// context when there is one.
fn describe_js_error(ctx: &rquickjs::Ctx<'_>, error: rquickjs::Error) -> String {
    if error.is_exception() {
        format!("{:?}", ctx.catch())
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_loads_bundled_routine() {
        let engine = BeautifyEngine::initialize().expect("engine should start");
        assert_eq!(engine.invocations(), 0);
    }

    #[test]
    fn blank_input_short_circuits_without_invoking_engine() {
        let engine = BeautifyEngine::initialize().unwrap();
        assert_eq!(engine.beautify("").unwrap(), "");
        assert_eq!(engine.beautify("   ").unwrap(), "");
        assert_eq!(engine.beautify("\n\t ").unwrap(), "");
        assert_eq!(engine.invocations(), 0);
    }

    #[test]
    fn beautify_reindents_minified_source() {
        let engine = BeautifyEngine::initialize().unwrap();
        let result = engine.beautify("var a=1;if(a){a=2;}").unwrap();
        assert!(!result.is_empty());
        assert!(result.contains('\n'), "expected line breaks in {result:?}");
        assert!(result.contains("a=2;"));
        assert_eq!(engine.invocations(), 1);
    }

    #[test]
    fn beautify_preserves_string_contents() {
        let engine = BeautifyEngine::initialize().unwrap();
        let result = engine.beautify(r#"var s="a;b{c}";"#).unwrap();
        assert!(result.contains(r#""a;b{c}""#));
    }

    #[test]
    fn for_loop_header_stays_on_one_line() {
        let engine = BeautifyEngine::initialize().unwrap();
        let result = engine.beautify("for(var i=0;i<3;i++){x(i);}").unwrap();
        assert!(result.contains("for(var i=0;i<3;i++)"));
    }

    #[test]
    fn calls_are_serialized_without_cross_contamination() {
        let engine = std::sync::Arc::new(BeautifyEngine::initialize().unwrap());
        let mut handles = Vec::new();
        for i in 0..8 {
            let engine = std::sync::Arc::clone(&engine);
            handles.push(std::thread::spawn(move || {
                let source = format!("var marker_{i}=1;if(marker_{i}){{marker_{i}=2;}}");
                let result = engine.beautify(&source).unwrap();
                assert!(
                    result.contains(&format!("marker_{i}")),
                    "output lost its own marker: {result:?}"
                );
                // Output must not contain any other thread's marker.
                for other in 0..8 {
                    if other != i {
                        assert!(!result.contains(&format!("marker_{other}")));
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(engine.invocations(), 8);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut engine = BeautifyEngine::initialize().unwrap();
        engine.shutdown();
        engine.shutdown();
        assert_eq!(
            engine.beautify("var a=1;").unwrap_err(),
            EngineError::EngineStopped
        );
        // Blank input still short-circuits after shutdown.
        assert_eq!(engine.beautify("").unwrap(), "");
    }
}
