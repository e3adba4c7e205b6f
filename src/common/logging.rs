// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use std::fs::OpenOptions;
use std::io;
use std::sync::OnceLock;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt};

static INIT: OnceLock<()> = OnceLock::new();

#[derive(Clone)]
struct SharedFileMakeWriter {
    file: Arc<Mutex<std::fs::File>>,
}

struct SharedFileWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl<'a> MakeWriter<'a> for SharedFileMakeWriter {
    type Writer = SharedFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileWriter {
            file: Arc::clone(&self.file),
        }
    }
}

impl io::Write for SharedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        file.flush()
    }
}

fn open_log_writer() -> Option<SharedFileMakeWriter> {
    let path = match std::env::var("PARTAGG_LOG_FILE") {
        Ok(path) if !path.trim().is_empty() => path.trim().to_string(),
        _ => return None,
    };
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some(SharedFileMakeWriter {
            file: Arc::new(Mutex::new(file)),
        }),
        Err(err) => {
            eprintln!("failed to open log file {}: {}, fallback to stderr", path, err);
            None
        }
    }
}

/// Installs the global tracing subscriber once. Filter comes from
/// `PARTAGG_LOG` (default `info`); `PARTAGG_LOG_FILE` redirects output to an
/// append-only file shared across threads. Embedding binaries and tests call
/// this; repeated calls are no-ops.
pub fn init_logging() {
    INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_env("PARTAGG_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));

        if let Some(make_writer) = open_log_writer() {
            tracing_fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(make_writer)
                .with_ansi(false)
                .init();
        } else {
            tracing_fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(io::stderr)
                .init();
        }
    });
}
