// Copyright 2024 Irreducible Inc.

use crate::env::boolean_env_flag_set;

/// Environment flag that turns on span close events, which carry the busy/idle timings of
/// every instrumented phase.
pub const SPAN_TIMINGS_FLAG: &str = "VORTEX_SPAN_TIMINGS";

/// Installs the global tracing subscriber.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. Calling this more than once is
/// harmless: later calls keep the subscriber installed first.
pub fn init_tracing() {
	use tracing_subscriber::{
		fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
	};

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let span_events = if boolean_env_flag_set(SPAN_TIMINGS_FLAG) {
		FmtSpan::CLOSE
	} else {
		FmtSpan::NONE
	};

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(
			tracing_subscriber::fmt::layer()
				.with_target(true)
				.with_span_events(span_events),
		)
		.try_init();
}
