//! nginx server-block template.

use std::fmt::Write;

use thiserror::Error;

use crate::certs::CertLayout;
use crate::routing::Route;

/// Rendering failure. Only a formatting defect can produce it.
#[derive(Debug, Error)]
#[error("failed to render proxy configuration: {0}")]
pub struct RenderError(#[from] std::fmt::Error);

const HEADER: &str = "# Generated by reprox. Manual changes are overwritten.\n";

/// Renders routes into nginx configuration text.
#[derive(Debug, Clone)]
pub struct NginxRenderer {
    layout: CertLayout,
}

impl NginxRenderer {
    pub fn new(layout: CertLayout) -> Self {
        Self { layout }
    }

    /// Render one redirect block and one TLS block per route, in order.
    pub fn render(&self, routes: &[Route]) -> Result<String, RenderError> {
        let mut out = String::from(HEADER);
        for route in routes {
            self.render_route(&mut out, route)?;
        }
        Ok(out)
    }

    fn render_route(&self, out: &mut String, route: &Route) -> Result<(), RenderError> {
        let paths = self.layout.paths(route.host());
        let host = route.host();

        write!(
            out,
            r#"
server {{
    listen 80;
    listen [::]:80;
    server_name {host};
    return 301 https://$host$request_uri;
}}

server {{
    listen 443 ssl http2;
    listen [::]:443 ssl http2;
    server_name {host};

    ssl_certificate {chain};
    ssl_certificate_key {key};

    ssl_protocols TLSv1.2 TLSv1.3;
    ssl_ciphers EECDH+AESGCM:EECDH+CHACHA20:EDH+AESGCM;
    ssl_prefer_server_ciphers on;
    ssl_session_cache shared:SSL:10m;
    ssl_session_timeout 1h;
    ssl_session_tickets off;

    location / {{
        proxy_pass http://{upstream};
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection 'upgrade';
        proxy_set_header Host $host;
        proxy_cache_bypass $http_upgrade;
    }}
}}
"#,
            host = host,
            chain = paths.chain.display(),
            key = paths.key.display(),
            upstream = route.upstream(),
        )?;
        Ok(())
    }
}
