//! Built-in proxy sources, in registration order

use crate::proxy::adapter::{
    AdapterKind, Endpoint, IpCell, JsonLayout, Source, TableLayout, TypeColumn,
};
use crate::proxy::models::ProxyType;

const PROXYSCRAPE_ENDPOINTS: &[Endpoint] = &[Endpoint {
    url: "https://api.proxyscrape.com/v2/?request=getproxies&protocol=http&timeout=10000&country=all&ssl=all&anonymity=all",
    proxy_type: ProxyType::Http,
}];

const PROXY_LIST_DOWNLOAD_ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        url: "https://www.proxy-list.download/api/v1/get?type=http",
        proxy_type: ProxyType::Http,
    },
    Endpoint {
        url: "https://www.proxy-list.download/api/v1/get?type=https",
        proxy_type: ProxyType::Https,
    },
    Endpoint {
        url: "https://www.proxy-list.download/api/v1/get?type=socks4",
        proxy_type: ProxyType::Socks4,
    },
    Endpoint {
        url: "https://www.proxy-list.download/api/v1/get?type=socks5",
        proxy_type: ProxyType::Socks5,
    },
];

const SPEEDX_ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        url: "https://raw.githubusercontent.com/TheSpeedX/SOCKS-List/master/http.txt",
        proxy_type: ProxyType::Http,
    },
    Endpoint {
        url: "https://raw.githubusercontent.com/TheSpeedX/SOCKS-List/master/socks4.txt",
        proxy_type: ProxyType::Socks4,
    },
    Endpoint {
        url: "https://raw.githubusercontent.com/TheSpeedX/SOCKS-List/master/socks5.txt",
        proxy_type: ProxyType::Socks5,
    },
    Endpoint {
        url: "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/http.txt",
        proxy_type: ProxyType::Http,
    },
    Endpoint {
        url: "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/socks4.txt",
        proxy_type: ProxyType::Socks4,
    },
    Endpoint {
        url: "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/socks5.txt",
        proxy_type: ProxyType::Socks5,
    },
];

/// Columns: IP, Port, Code, Country, Anonymity, Google, Https, Last Checked
const FREE_PROXY_LIST_TABLE: TableLayout = TableLayout {
    table: "table",
    header_rows: 1,
    min_columns: 7,
    ip: 0,
    ip_cell: IpCell::Plain,
    port: 1,
    proxy_type: TypeColumn::HttpsFlag(6),
    country: Some(3),
    anonymity: Some(4),
};

/// Columns: IP, Port, Country/City, Speed, Type, Anonymity, Latest update
const HIDEMY_NAME_TABLE: TableLayout = TableLayout {
    table: "table.proxy__t",
    header_rows: 1,
    min_columns: 6,
    ip: 0,
    ip_cell: IpCell::Plain,
    port: 1,
    proxy_type: TypeColumn::Tag(4),
    country: Some(2),
    anonymity: Some(5),
};

/// Two header rows; the first cell carries `ip:port`
const SPYS_ONE_TABLE: TableLayout = TableLayout {
    table: r#"table[width="100%"]"#,
    header_rows: 2,
    min_columns: 10,
    ip: 0,
    ip_cell: IpCell::HostPort,
    port: 1,
    proxy_type: TypeColumn::Tag(2),
    country: Some(3),
    anonymity: Some(4),
};

const OPENPROXY_SPACE_JSON: JsonLayout = JsonLayout {
    array: "proxies",
    ip: "ip",
    port: "port",
    proxy_type: Some("protocol"),
    country: Some("country"),
    anonymity: None,
};

pub const PROXYSCRAPE: Source = Source {
    name: "ProxyScrape",
    kind: AdapterKind::PlainList(PROXYSCRAPE_ENDPOINTS),
};

pub const FREE_PROXY_LIST: Source = Source {
    name: "Free Proxy List",
    kind: AdapterKind::HtmlTable {
        url: "https://free-proxy-list.net/",
        layout: FREE_PROXY_LIST_TABLE,
    },
};

pub const PROXY_LIST_DOWNLOAD: Source = Source {
    name: "Proxy List Download",
    kind: AdapterKind::PlainList(PROXY_LIST_DOWNLOAD_ENDPOINTS),
};

pub const HIDEMY_NAME: Source = Source {
    name: "HideMy.Name",
    kind: AdapterKind::HtmlTable {
        url: "https://hidemy.name/en/proxy-list/",
        layout: HIDEMY_NAME_TABLE,
    },
};

pub const SPYS_ONE: Source = Source {
    name: "Spys.One",
    kind: AdapterKind::HtmlTable {
        url: "https://spys.one/en/free-proxy-list/",
        layout: SPYS_ONE_TABLE,
    },
};

pub const OPENPROXY_SPACE: Source = Source {
    name: "OpenProxy.Space",
    kind: AdapterKind::JsonApi {
        url: "https://openproxy.space/api/proxies",
        layout: OPENPROXY_SPACE_JSON,
    },
};

pub const SPEEDX: Source = Source {
    name: "SpeedX Proxy List",
    kind: AdapterKind::PlainList(SPEEDX_ENDPOINTS),
};

/// Get every built-in source
pub fn builtin_sources() -> Vec<Source> {
    vec![
        PROXYSCRAPE,
        FREE_PROXY_LIST,
        PROXY_LIST_DOWNLOAD,
        HIDEMY_NAME,
        SPYS_ONE,
        OPENPROXY_SPACE,
        SPEEDX,
    ]
}
