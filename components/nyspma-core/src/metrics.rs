// Copyright (c) 2018 Chef Software Inc. and/or applicable contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{borrow::Cow,
          env,
          sync::{mpsc::{channel,
                        Receiver,
                        Sender},
                 Mutex},
          thread};

use dogstatsd::{Client,
                OptionsBuilder};

// Statsd Application name
pub const APP_NAME: &str = "nyspma";

// Statsd Listener Address
pub const STATS_ENV: &str = "NYSPMA_STATS_ADDR";

// Public Interface
////////////////////////////////////////////////////////////////////////

/// Metric identifiers will usually be static `str`s, but some may
/// need to be dynamically-generated `String`s. With a `Cow`, we can
/// accept either.
pub type MetricId = Cow<'static, str>;

/// All metrics must implement the Metric trait, as well as one of the
/// type marker traits (e.g., `CounterMetric`).
pub trait Metric {
    /// Generate the metric name to be used
    fn id(&self) -> MetricId;
}

pub trait CounterMetric: Metric {
    /// Increment the metric by one
    fn increment(&self) {
        let sender = match SENDER.lock() {
            Ok(sender) => sender,
            Err(e) => {
                error!("Metrics sender poisoned, error: {:?}", e);
                return;
            }
        };
        if let Err(e) = sender.send((MetricType::Counter, MetricOperation::Increment, self.id())) {
            error!("Failed to increment counter, error: {:?}", e);
        }
    }
}

// Implementation Details
////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy)]
enum MetricType {
    Counter,
}

#[derive(Debug, Clone, Copy)]
enum MetricOperation {
    Increment,
}

type MetricTuple = (MetricType, MetricOperation, MetricId);

lazy_static! {
    static ref SENDER: Mutex<Sender<MetricTuple>> = Mutex::new(init());
}

// init creates a worker thread ready to receive and process metric events,
// and returns a channel for use by metric senders
fn init() -> Sender<MetricTuple> {
    let (tx, rx) = channel::<MetricTuple>();

    if let Err(e) = thread::Builder::new().name("metrics".to_string())
                                          .spawn(move || receive(rx))
    {
        error!("Couldn't start metrics thread, err: {:?}", e);
    }
    tx
}

// receive runs in a separate thread and processes all metrics events
fn receive(rx: Receiver<MetricTuple>) {
    let client = statsd_client();

    while let Ok((mtyp, mop, mid)) = rx.recv() {
        debug!("Received metrics tuple: {:?}", (mtyp, mop, &mid));

        if let Some(ref cli) = client {
            match (mtyp, mop) {
                (MetricType::Counter, MetricOperation::Increment) => {
                    let tags: [&str; 0] = [];
                    cli.incr(mid.clone(), &tags)
                       .unwrap_or_else(|e| warn!("Could not increment metric; {:?}", e))
                }
            }
        }
    }
}

fn statsd_client() -> Option<Client> {
    match env::var(STATS_ENV) {
        Ok(addr) => {
            info!("Creating DogStatsD client sending to: {}", addr);

            // Bind to an arbitrary UDP port for sending.
            let options = OptionsBuilder::new().from_addr("0.0.0.0:0".to_string())
                                               .to_addr(addr)
                                               .namespace(APP_NAME.to_string())
                                               .build();
            match Client::new(options) {
                Ok(c) => Some(c),
                Err(e) => {
                    error!("Error creating statsd client: {:?}", e);
                    None
                }
            }
        }
        Err(_) => None,
    }
}
