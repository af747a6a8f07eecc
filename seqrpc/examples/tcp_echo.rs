//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! TCP echo service example.
//!
//! Starts a server router and a client router in one process, connected over
//! a local TCP socket, and makes a few calls across it.
//!
//! # Features Demonstrated
//! - Registering targets with exposed and local-only operations
//! - Blocking and polling result retrieval
//! - Remote errors and void returns
//! - Client reconnection strategy configuration
//!
//! # Running the Example
//! ```bash
//! RUST_LOG=seqrpc=debug cargo run --example tcp_echo
//! ```

use seqrpc::codec::{RemoteError, Value};
use seqrpc::router::{CallError, Router, RouterConfig, TargetObject};
use seqrpc::transport::strategy::ExponentialBackoff;
use seqrpc::transport::{TcpTransport, TcpTransportConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn echo_service(counter: Arc<AtomicU64>) -> TargetObject {
    let pings = counter.clone();
    TargetObject::new()
        .rpc_method("echo", |mut args: Vec<Value>| async move {
            Ok(args.pop().unwrap_or(Value::Null))
        })
        .rpc_method("upper", |args: Vec<Value>| async move {
            match args.first().and_then(Value::as_str) {
                Some(text) => Ok(Value::from(text.to_uppercase())),
                None => Err(RemoteError::new("IllegalArgument", "upper expects a string")),
            }
        })
        .rpc_void_method("ping", move |_| {
            let pings = pings.clone();
            async move {
                pings.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
        })
        .local_method("reset", move |_| {
            let counter = counter.clone();
            async move {
                counter.store(0, Ordering::Relaxed);
                Ok(Value::Null)
            }
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== TCP Echo Example ===\n");

    let listener = TcpTransport::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    println!("✓ Listening on {}", address);

    let pings = Arc::new(AtomicU64::new(0));
    let server_pings = pings.clone();
    let server = tokio::spawn(async move {
        let (transport, peer) = TcpTransport::accept(&listener).await?;
        println!("✓ Accepted connection from {}", peer);
        let router = Router::new(Arc::new(transport), RouterConfig::default());
        router.register_target_object("echo", echo_service(server_pings));
        router.start(None);
        Ok::<_, seqrpc::TransportError>(router)
    });

    let strategy = ExponentialBackoff::builder()
        .initial_delay(Duration::from_millis(100))
        .max_attempts(Some(3))
        .build();
    let config =
        TcpTransportConfig::new(address.to_string()).with_reconnection_strategy(Arc::new(strategy));
    let client = Router::new(
        Arc::new(TcpTransport::connect_with(config).await?),
        RouterConfig::default(),
    );
    client.start(None);
    let server = server.await??;

    // blocking retrieval
    let sequence = client.call("echo", "echo", vec![Value::from("hello")]);
    let reply = client
        .get_return_blocking(sequence, Some(Duration::from_secs(2)))
        .await?;
    println!("← echo: {:?}", reply);

    // one-shot helper
    let upper = client
        .invoke("echo", "upper", vec![Value::from("shout")], Duration::from_secs(2))
        .await?;
    println!("← upper: {:?}", upper);

    // remote errors
    match client
        .invoke("echo", "upper", vec![Value::Int(7)], Duration::from_secs(2))
        .await
    {
        Err(error) => println!("← upper(7) failed: {}", error),
        Ok(value) => println!("← upper(7) unexpectedly returned {:?}", value),
    }
    match client
        .invoke("echo", "reset", vec![], Duration::from_secs(2))
        .await
    {
        Err(error) => println!("← reset refused: {}", error),
        Ok(_) => println!("← reset unexpectedly ran"),
    }

    // void returns, collected by polling
    let sequences: Vec<u64> = (0..3).map(|_| client.call("echo", "ping", vec![])).collect();
    for sequence in sequences {
        loop {
            match client.get_return(sequence) {
                Ok(value) => {
                    println!("← ping {}: void = {}", sequence, value.is_void());
                    break;
                }
                Err(CallError::NotAvailable { .. }) => {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
    println!("✓ Server counted {} pings", pings.load(Ordering::Relaxed));

    let snapshot = client.metrics().snapshot();
    println!(
        "\nClient: {} calls sent, {} returns matched",
        snapshot.calls_sent, snapshot.returns_matched
    );

    client.stop(true).await;
    server.stop(true).await;
    println!("✓ Done");
    Ok(())
}
