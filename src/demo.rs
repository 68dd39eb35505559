//! Small CPU-bound application served by the `http_profiler` binary.
//!
//! | Path | Work |
//! |------|------|
//! | `/fib?n=27` | naive recursive Fibonacci |
//! | `/sort?n=200000` | sort a pseudo-random vector |
//! | anything else | a little of both |

use async_trait::async_trait;
use http::StatusCode;

use crate::core::{Handler, Request, Response};

const DEFAULT_FIB: u32 = 27;
const MAX_FIB: u32 = 35;
const DEFAULT_SORT: usize = 200_000;
const MAX_SORT: usize = 5_000_000;

/// Demo application with deliberately slow endpoints.
#[derive(Clone, Copy, Debug, Default)]
pub struct DemoApp;

#[async_trait]
impl Handler for DemoApp {
    async fn call(&self, req: Request) -> Response {
        match req.path() {
            "/fib" => {
                let n = query_number(req.query(), "n")
                    .map(|n| n.min(MAX_FIB as u64) as u32)
                    .unwrap_or(DEFAULT_FIB);
                Response::text(StatusCode::OK, format!("fib({}) = {}\n", n, fib(n)))
            }
            "/sort" => {
                let n = query_number(req.query(), "n")
                    .map(|n| n.min(MAX_SORT as u64) as usize)
                    .unwrap_or(DEFAULT_SORT);
                let sorted = sort_random(n);
                Response::text(
                    StatusCode::OK,
                    format!("sorted {} values, median {}\n", n, sorted.get(n / 2).copied().unwrap_or(0)),
                )
            }
            _ => {
                let checksum = fib(20) + sort_random(10_000).len() as u64;
                Response::text(
                    StatusCode::OK,
                    format!("Hello from {} (checksum {})\n", req.path(), checksum),
                )
            }
        }
    }
}

fn fib(n: u32) -> u64 {
    if n < 2 {
        u64::from(n)
    } else {
        fib(n - 1) + fib(n - 2)
    }
}

fn sort_random(n: usize) -> Vec<u64> {
    // Numerical Recipes LCG
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut values: Vec<u64> = (0..n)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            state >> 16
        })
        .collect();
    values.sort_unstable();
    values
}

fn query_number(query: Option<&str>, key: &str) -> Option<u64> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| v.parse().ok())
}
