//! Lua bindings for the canscript broker
//!
//! Installs these globals into a Lua state:
//! * `CAN_Handle`, with the `CAN_Handle.new(bus, signature, data_type)` constructor, and the
//!   same table as `DroneCAN_Handle`. Handles expose `broadcast`, `request`, `subscribe`,
//!   `check_message`, `canfd` and `close`.
//! * `Parameter`, the parameter handle constructor, `Parameter()` or `Parameter(name)`.
//!
//! Bad arguments abort the call with a Lua error and leave the broker untouched. Failures the
//! broker reports as `false`/`None` are returned to the script as `false`/`nil`.
//!
//! Handles are closed when collected, or earlier with `h:close()`.
//!
//! ```
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use canscript::broker::Broker;
//! use canscript::config::Config;
//! use mlua::Lua;
//!
//! let broker: &'static Broker<'static, CriticalSectionRawMutex> =
//!     Box::leak(Box::new(Broker::new(Config::default())));
//! let lua = Lua::new();
//! canscript_lua::register_can_handle(&lua, broker).unwrap();
//!
//! // No driver on bus 0
//! let result = lua.load("return CAN_Handle.new(0, 0x1234, 1030)").exec();
//! assert!(result.is_err());
//! ```

mod handle;
mod parameter;

pub use handle::{CAN_HANDLE_NAME, DRONECAN_HANDLE_NAME, LuaHandle, register_can_handle};
pub use parameter::{LuaParameter, register_parameter};
