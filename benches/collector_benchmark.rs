use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use goir::patch::set_output_base;
use goir::{aggregate, collect_file};
use goir_parser::lexer::Lexer;
use goir_parser::parse_source;
use std::hint::black_box as bb;

// =============================================================================
// Corpus
// =============================================================================

const SMALL_HELLO_WORLD: &str = r#"
package main

func main() {
    println("Hello, World!")
}
"#;

const MEDIUM_STRUCT_METHODS: &str = r#"
package geometry

// Point is a location in the plane.
type Point struct {
    X, Y float64
}

func (p Point) Abs() float64 {
    return sqrt(p.X*p.X + p.Y*p.Y)
}

func (p *Point) Scale(f float64) {
    p.X = p.X * f
    p.Y = p.Y * f
}

type Rectangle struct {
    Min, Max Point
    Tags     map[string][]string `json:"tags"`
}

func (r Rectangle) Area() float64 {
    return (r.Max.X - r.Min.X) * (r.Max.Y - r.Min.Y)
}
"#;

const LARGE_SERVICE: &str = r#"
// +build linux darwin

package service

import (
    "context"
    "fmt"
    h "net/http"
)

//go:generate mockgen -source=service.go -destination=mock.go
const (
    Version      = "1.4.2"
    MaxRetries   = 5
    backoffScale = 1.5
)

var defaultTimeout = 30

type Mode uint8

const (
    ModeIdle Mode = iota
    ModeRunning
)

// Store persists records.
type Store interface {
    fmt.Stringer
    Get(ctx context.Context, key string) ([]byte, error)
    Put(ctx context.Context, key string, value []byte) error
    Watch(prefix string) <-chan Event
}

type Event struct {
    Key   string
    Value []byte
    Rev   [2]uint64
}

// Service wires handlers to a store.
type Service struct {
    Name     string                 `json:"name"`
    store    Store
    handlers map[string]func(w h.ResponseWriter, r *h.Request)
    routes   []*Route
    buf      [64]byte
    events   chan<- Event
    limits   map[string]map[int]bool
    *h.Client
}

type Route struct {
    Path    string
    Methods []string
    Auth    interface{}
}

func New(name string, store Store, opts ...Option) *Service {
    s := &Service{Name: name, store: store}
    for _, opt := range opts {
        opt(s)
    }
    return s
}

func (s *Service) Start(ctx context.Context) error {
    for {
        select {
        case <-ctx.Done():
            return ctx.Err()
        default:
        }
    }
}

func (s *Service) Handle(path string, fn func(w h.ResponseWriter, r *h.Request)) {
    s.handlers[path] = fn
}

func (m Mode) String() string {
    switch m {
    case ModeIdle:
        return "idle"
    default:
        return fmt.Sprintf("mode(%d)", uint8(m))
    }
}

type Option func(*Service)
"#;

const CORPORA: [(&str, &str); 3] = [
    ("small", SMALL_HELLO_WORLD),
    ("medium", MEDIUM_STRUCT_METHODS),
    ("large", LARGE_SERVICE),
];

// =============================================================================
// Benchmark 1: lexing alone
// =============================================================================

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    for (name, input) in CORPORA {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("iterate_only", name), &input, |b, &input| {
            b.iter(|| {
                let mut acc: u64 = 0;
                for (l, _, r) in Lexer::new(bb(input)) {
                    acc = acc.wrapping_add(l as u64).wrapping_add(r as u64);
                }
                bb(acc);
            });
        });
    }
    group.finish();
}

// =============================================================================
// Benchmark 2: parse, then parse + collect
// =============================================================================

fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect");
    for (name, input) in CORPORA {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", name), &input, |b, &input| {
            b.iter(|| bb(parse_source(bb(input)).is_ok()));
        });

        let Ok(parsed) = parse_source(input) else {
            panic!("benchmark corpus `{name}` does not parse");
        };
        group.bench_with_input(BenchmarkId::new("collect_only", name), &parsed, |b, parsed| {
            b.iter(|| bb(collect_file("bench.go", bb(parsed))));
        });
        group.bench_with_input(BenchmarkId::new("parse_and_collect", name), &input, |b, &input| {
            b.iter(|| {
                if let Ok(parsed) = parse_source(bb(input)) {
                    bb(collect_file("bench.go", &parsed));
                }
            });
        });
    }
    group.finish();
}

// =============================================================================
// Benchmark 3: per-plugin payload preparation
// =============================================================================

fn bench_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload");
    let Ok(parsed) = parse_source(LARGE_SERVICE) else {
        panic!("benchmark corpus does not parse");
    };
    // one document with many copies of the same file
    let data = aggregate((0..64).map(|i| collect_file(&format!("f{i}.go"), &parsed)));
    let Ok(payload) = serde_json::to_vec(&data) else {
        panic!("document does not serialize");
    };

    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("serialize", |b| {
        b.iter(|| bb(serde_json::to_vec(bb(&data)).map(|v| v.len())));
    });
    group.bench_function("patch_output_base", |b| {
        b.iter(|| bb(set_output_base(bb(&payload), "./generated/out").map(|v| v.len())));
    });
    group.finish();
}

criterion_group!(benches, bench_lexer, bench_collect, bench_payload);
criterion_main!(benches);
