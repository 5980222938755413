pub use self::bufreader::BufReader;

mod bufreader;
