// Tests for champ select automation




#[cfg(test)]
mod test_monitor;
