pub mod shared {
    pub mod core {
        pub mod trace_context;
    }
    pub mod infrastructure {
        pub mod auth_token;
        pub mod database;
        pub mod event_bus;
        pub mod outbox;
    }
}

pub mod modules {
    pub mod products {
        pub mod core {
            pub mod events;
            pub mod ports;
            pub mod product;
        }
        pub mod use_cases {
            pub mod application_error;
            pub mod create_product {
                pub mod command;
                pub mod handler;
            }
            pub mod update_product {
                pub mod command;
                pub mod handler;
            }
            pub mod update_stock_level {
                pub mod command;
                pub mod handler;
            }
            pub mod update_pricing {
                pub mod command;
                pub mod handler;
            }
            pub mod delete_product {
                pub mod command;
                pub mod handler;
            }
            pub mod get_product {
                pub mod handler;
            }
            pub mod list_products {
                pub mod handler;
            }
            pub mod process_outbox {
                pub mod registry;
                pub mod sweeper;
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod bus_event_publisher;
                pub mod in_memory_event_publisher;
                pub mod in_memory_product_repository;
                pub mod postgres_product_repository;
            }
        }
    }
}

pub mod shell;
