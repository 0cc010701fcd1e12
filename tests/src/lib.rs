#[cfg(test)]
mod properties;
