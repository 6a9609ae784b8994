//! Bridge runtime: one cooperative executor running every peripheral
//! task plus the publisher.
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────┐
//!  │  futures_lite::block_on                                  │
//!  │  ┌────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                      │  │
//!  │  │                                                    │  │
//!  │  │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────────┐   │  │
//!  │  │  │ dht22  │ │ ky018  │ │ ky026  │ │ led/button │   │  │
//!  │  │  │ 60 s ⏱ │ │ 60 s ⏱ │ │ 1 s ⏱  │ │ 10 ms ⏱    │   │  │
//!  │  │  └────────┘ └────────┘ └────────┘ └────────────┘   │  │
//!  │  │  ┌──────────────────────────────┐                  │  │
//!  │  │  │ publisher: drain → sink      │                  │  │
//!  │  │  └──────────────────────────────┘                  │  │
//!  │  └────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every task first waits on the readiness gate. The publisher also
//! holds changes back while the gate is closed. Tasks are spawned in
//! registration order; nothing orders them across intervals.

use core::cell::Cell;

use log::info;

use crate::app::ports::{PropertySink, Timebase};
use crate::device::Device;
use crate::error::Result;
use crate::gate::ReadinessGate;
use crate::task::{Peripheral, wait_then_every};

/// Executor run-queue depth.
const RUN_QUEUE: usize = 16;

pub struct Bridge<'a, T> {
    device: &'a Device,
    gate: &'a ReadinessGate,
    time: &'a T,
    executor: edge_executor::LocalExecutor<'a, RUN_QUEUE>,
    tasks: Cell<usize>,
}

impl<'a, T: Timebase> Bridge<'a, T> {
    pub fn new(device: &'a Device, gate: &'a ReadinessGate, time: &'a T) -> Self {
        Self {
            device,
            gate,
            time,
            executor: edge_executor::LocalExecutor::new(),
            tasks: Cell::new(0),
        }
    }

    /// Register the peripheral's node with the device and spawn its task.
    pub fn register<P: Peripheral + 'a>(&self, peripheral: P) -> Result<()> {
        let node = peripheral.node();
        self.device.add_node(node.clone())?;
        self.executor
            .spawn(peripheral.run(self.gate, self.time))
            .detach();
        self.tasks.set(self.tasks.get() + 1);
        info!("bridge: task {} spawned for {}", self.tasks.get(), node.id());
        Ok(())
    }

    /// Spawn the publisher: once ready, forward pending changes to `sink`
    /// every `interval_ms`.
    pub fn attach_sink<S: PropertySink + 'a>(&self, sink: S, interval_ms: u32) {
        self.executor
            .spawn(publish_loop(self.device, self.gate, self.time, sink, interval_ms))
            .detach();
        self.tasks.set(self.tasks.get() + 1);
    }

    pub fn task_count(&self) -> usize {
        self.tasks.get()
    }

    /// Run one scheduled task step. `false` when nothing is runnable.
    pub fn try_tick(&self) -> bool {
        self.executor.try_tick()
    }

    /// Drive all tasks forever.
    pub async fn run(&self) {
        info!("bridge: running {} tasks", self.tasks.get());
        self.executor.run(core::future::pending::<()>()).await;
    }
}

async fn publish_loop<T: Timebase, S: PropertySink>(
    device: &Device,
    gate: &ReadinessGate,
    time: &T,
    mut sink: S,
    interval_ms: u32,
) {
    wait_then_every(gate, time, interval_ms, |_| {
        // Changes stay pending while disconnected.
        if !gate.is_ready() {
            return;
        }
        device.drain_pending(|node, property| {
            if let Some(payload) = property.payload() {
                sink.publish(node, property, &payload);
            }
        });
    })
    .await;
}
