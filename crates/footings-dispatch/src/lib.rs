//! footings-dispatch: tabla de despacho por tuplas de claves string.
//!
//! Un `Dispatcher` declara una lista ordenada de parámetros. Cada registro
//! asocia un callable a una o más tuplas de claves (producto cartesiano de los
//! valores dados por parámetro). Una llamada extrae esos parámetros de sus
//! argumentos, busca la tupla y reenvía el resto al callable encontrado, o al
//! default si no hay coincidencia.
pub mod args;
pub mod dispatcher;
pub mod errors;

pub use args::DispatchArgs;
pub use dispatcher::{Dispatcher, Handler, Registrar};
pub use errors::{DispatcherKeyError, DispatcherRegisterError};
