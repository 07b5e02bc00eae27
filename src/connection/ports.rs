// ABOUTME: Port binding parsing and lookup.
// ABOUTME: Parses the external tool's "80/tcp -> 0.0.0.0:32768" lines.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortParseError {
    #[error("malformed port line: `{0}`")]
    MalformedLine(String),

    #[error("invalid port number in line: `{0}`")]
    BadPort(String),
}

/// One internal-to-external port binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    pub internal: u16,
    pub external: u16,
    /// The bind address the tool reported, usually 0.0.0.0.
    pub bind_ip: String,
}

/// All resolved bindings of one container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortMappings(Vec<PortMapping>);

impl PortMappings {
    pub fn new(mappings: Vec<PortMapping>) -> Self {
        Self(mappings)
    }

    /// Parse the output of a `port` query, one binding per line.
    pub fn parse(output: &str) -> Result<Self, PortParseError> {
        let mut mappings = Vec::new();
        for line in output.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            mappings.push(parse_line(line)?);
        }
        Ok(Self(mappings))
    }

    pub fn internal(&self, port: u16) -> Option<&PortMapping> {
        self.0.iter().find(|m| m.internal == port)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PortMapping> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn parse_line(line: &str) -> Result<PortMapping, PortParseError> {
    let (left, right) = line
        .split_once("->")
        .ok_or_else(|| PortParseError::MalformedLine(line.to_string()))?;

    let internal = left
        .trim()
        .split('/')
        .next()
        .unwrap_or_default()
        .parse::<u16>()
        .map_err(|_| PortParseError::BadPort(line.to_string()))?;

    let (bind_ip, external) = right
        .trim()
        .rsplit_once(':')
        .ok_or_else(|| PortParseError::MalformedLine(line.to_string()))?;

    let external = external
        .parse::<u16>()
        .map_err(|_| PortParseError::BadPort(line.to_string()))?;

    Ok(PortMapping {
        internal,
        external,
        bind_ip: bind_ip.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_tcp_binding() {
        let mappings = PortMappings::parse("80/tcp -> 0.0.0.0:32768\n").unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(
            mappings.internal(80),
            Some(&PortMapping {
                internal: 80,
                external: 32768,
                bind_ip: "0.0.0.0".to_string(),
            })
        );
    }

    #[test]
    fn parses_multiple_bindings_and_skips_blanks() {
        let output = "80/tcp -> 0.0.0.0:32768\n\n5432/tcp -> 127.0.0.1:5432\n";
        let mappings = PortMappings::parse(output).unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings.internal(5432).unwrap().external, 5432);
    }

    #[test]
    fn parses_ipv6_bind_address() {
        let mappings = PortMappings::parse("80/tcp -> [::]:32768").unwrap();
        assert_eq!(mappings.internal(80).unwrap().external, 32768);
        assert_eq!(mappings.internal(80).unwrap().bind_ip, "[::]");
    }

    #[test]
    fn no_bindings_is_fine() {
        let mappings = PortMappings::parse("").unwrap();
        assert!(mappings.is_empty());
    }

    #[test]
    fn unknown_internal_port_is_none() {
        let mappings = PortMappings::parse("80/tcp -> 0.0.0.0:32768").unwrap();
        assert!(mappings.internal(8080).is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            PortMappings::parse("not a port line"),
            Err(PortParseError::MalformedLine(_))
        ));
        assert!(matches!(
            PortMappings::parse("eighty/tcp -> 0.0.0.0:32768"),
            Err(PortParseError::BadPort(_))
        ));
    }
}
