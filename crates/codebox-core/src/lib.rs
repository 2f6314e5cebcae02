//! # codebox-core
//!
//! Session client for remote CodeBox sandboxes.
//!
//! This crate manages the lifecycle of a single stateful execution session
//! reachable over HTTP: starting it, running code, moving files and
//! installing packages inside it, and tearing it down.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   codebox-core (client)                  │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌─────────────────┐     ┌──────────────────────────┐   │
//! │  │    CodeBox      │────▶│  SessionState            │   │
//! │  │  - start()      │     │  Uninitialized |         │   │
//! │  │  - run()        │     │  Active { id } |         │   │
//! │  │  - upload()     │     │  Disposed                │   │
//! │  │  - stop()       │     └──────────────────────────┘   │
//! │  └─────────────────┘                                    │
//! │           │ dispatch                                     │
//! │           ▼                                              │
//! │  ┌─────────────────┐                                    │
//! │  │ dyn Transport   │  (HttpTransport: reqwest, bearer)  │
//! │  └─────────────────┘                                    │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//!                           │ HTTPS
//!                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │            CodeBox service  {base}/codebox/...           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use codebox_core::{CodeBox, CodeBoxConfig};
//!
//! # async fn example() -> codebox_core::Result<()> {
//! let config = CodeBoxConfig::builder()
//!     .api_key("sk-...")
//!     .build()?;
//! let codebox = CodeBox::new(&config)?;
//!
//! codebox.start().await?;
//!
//! let output = codebox.run("print('Hello from CodeBox!')").await?;
//! println!("{}", output);
//!
//! codebox.upload("data.csv", "a,b\n1,2\n").await?;
//! for file in codebox.list_files().await? {
//!     println!("{}", file);
//! }
//!
//! codebox.stop().await?;
//! codebox.cleanup().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod transport;
mod types;

pub use client::{CodeBox, Phase};
pub use config::{CodeBoxConfig, CodeBoxConfigBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{CodeBoxError, ConfigError, Result, TransportError};
pub use transport::{HttpTransport, Method, Transport};
pub use types::{FileRef, Output, SessionId, Status};
