// Crate entry point. Declare and expose modules so tests and the binary can import them.
//
// Layout
// - core: ports, partition scheme, watermark, retry policy, NDJSON encoding. No I/O.
// - application: fetcher, checkpoint store, entity tasks, writer, orchestrator.
// - adapters: reqwest page source, object_store blob store, in memory doubles.
// - shell: configuration and wiring for the binary.

pub mod core {
    pub mod ndjson;
    pub mod partition;
    pub mod ports;
    pub mod retry;
    pub mod watermark;
}

pub mod application {
    pub mod checkpoint;
    pub mod errors;
    pub mod fetcher;
    pub mod orchestrator;
    pub mod tasks;
    pub mod writer;
}

pub mod adapters {
    pub mod http {
        pub mod rawg_page_source;
    }
    pub mod storage {
        pub mod object_store_blob_store;
    }
    pub mod in_memory {
        pub mod in_memory_blob_store;
        pub mod scripted_page_source;
    }
}

pub mod shell;

#[cfg(test)]
pub mod test_support {
    pub mod fixtures;
}
