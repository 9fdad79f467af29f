//! Test doubles for the bus, sensor, transport and indicator.

pub(crate) mod mock;

pub(crate) use mock::{MockBus, MockI2c, MockPin, MockTransport, ScriptedSource};
