/*
 * Test Suite for gpiogate
 *
 * Unit tests live next to the code they cover. This module holds the shared
 * fixtures and the end-to-end scenarios that run a loaded driver module
 * (output GPIO18, input GPIO25) against a fake register block.
 */

pub mod support;
